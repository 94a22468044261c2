use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::document::Document;
use crate::domain::DomainError;

/// Handle to a retrieval backend, supplied by the caller for each run
///
/// Backends that can report a similarity score per hit advertise it through
/// [`Retriever::supports_scoring`] and implement
/// [`Retriever::similarity_search_with_score`]; the rest only implement
/// [`Retriever::retrieve`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Whether scored similarity search is available
    fn supports_scoring(&self) -> bool {
        false
    }

    /// Top-`k` hits paired with their raw similarity score (or distance)
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, DomainError> {
        let _ = (query, k);
        Err(DomainError::unsupported("scored similarity search"))
    }

    /// Plain top-`k` retrieval without scores
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, DomainError>;

    /// Backend name used in logs
    fn name(&self) -> &str {
        "retriever"
    }
}
