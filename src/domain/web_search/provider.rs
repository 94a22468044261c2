use async_trait::async_trait;
use std::fmt::Debug;

use super::WebSearchResult;
use crate::domain::DomainError;

/// External search provider used to augment evidence
#[async_trait]
pub trait WebSearchProvider: Send + Sync + Debug {
    /// Search the web, returning at most `max_results` hits
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, DomainError>;

    fn provider_name(&self) -> &'static str;
}
