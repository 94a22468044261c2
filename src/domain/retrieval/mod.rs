//! Retrieval domain

mod retriever;

pub use retriever::Retriever;

#[cfg(test)]
pub use retriever::MockRetriever;
