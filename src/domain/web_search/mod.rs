//! Web search domain

mod provider;
mod result;

pub use provider::WebSearchProvider;
pub use result::WebSearchResult;

#[cfg(test)]
pub use provider::mock::MockWebSearchProvider;
