//! Corrective RAG graph executor

mod executor_impl;
mod steps;

pub use executor_impl::{CorrectiveRagExecutor, GraphComponents};
