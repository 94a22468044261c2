use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::web_search::{WebSearchProvider, WebSearchResult};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// How much effort Tavily spends per query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }
}

/// Tavily search API client
#[derive(Debug)]
pub struct TavilySearchProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    search_depth: SearchDepth,
}

impl<C: HttpClientTrait> TavilySearchProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_TAVILY_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_depth: SearchDepth::default(),
        }
    }

    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> WebSearchProvider for TavilySearchProvider<C> {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, DomainError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "query": query,
            "max_results": max_results,
            "search_depth": self.search_depth.as_str(),
        });

        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let json = self.client.post_json(&self.search_url(), headers, &body).await?;

        let response: TavilyResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("tavily", format!("Failed to parse response: {}", e))
        })?;

        let results: Vec<WebSearchResult> = response
            .results
            .into_iter()
            .take(max_results)
            .map(|r| WebSearchResult::new(r.title, r.url, r.content, r.score))
            .collect();

        debug!(query = %query, results = results.len(), "Tavily search completed");

        Ok(results)
    }

    fn provider_name(&self) -> &'static str {
        "tavily"
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::{HttpClient, MockHttpClient};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tavily_body() -> serde_json::Value {
        json!({
            "query": "vector database",
            "results": [
                {"title": "Vector DB", "url": "https://a.test", "content": "Stores embeddings.", "score": 0.91},
                {"title": "ANN search", "url": "https://b.test", "content": "Approximate neighbours.", "score": 0.72},
                {"title": "Qdrant", "url": "https://c.test", "content": "A vector engine.", "score": 0.66},
                {"title": "Extra", "url": "https://d.test", "content": "Ignored.", "score": 0.2}
            ]
        })
    }

    #[tokio::test]
    async fn test_search_maps_and_truncates_results() {
        let client =
            MockHttpClient::new().with_response("https://api.tavily.com/search", tavily_body());
        let provider = TavilySearchProvider::new(client, "tvly-key");

        let results = provider.search("vector database", 3).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            WebSearchResult::new("Vector DB", "https://a.test", "Stores embeddings.", 0.91)
        );

        let body = &provider.client.bodies()[0];
        assert_eq!(body["query"], "vector database");
        assert_eq!(body["max_results"], 3);
        assert_eq!(body["search_depth"], "basic");
    }

    #[tokio::test]
    async fn test_zero_results_skips_request() {
        let provider = TavilySearchProvider::new(MockHttpClient::new(), "k");
        assert!(provider.search("q", 0).await.unwrap().is_empty());
        assert!(provider.client.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        let client = MockHttpClient::new().with_error("https://api.tavily.com/search", "HTTP 432");
        let provider = TavilySearchProvider::new(client, "k");

        assert!(matches!(
            provider.search("q", 3).await,
            Err(DomainError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-key"))
            .and(body_partial_json(json!({"search_depth": "advanced", "max_results": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(tavily_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TavilySearchProvider::with_base_url(HttpClient::new(), "tvly-key", server.uri())
            .with_search_depth(SearchDepth::Advanced);

        let results = provider.search("vector database", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "ANN search");
        assert_eq!(
            results[1].clone().into_document().source(),
            Some("ANN search\nhttps://b.test")
        );
    }

    #[tokio::test]
    async fn test_unexpected_payload_is_an_error() {
        let client = MockHttpClient::new()
            .with_response("https://api.tavily.com/search", json!({"results": [{"title": "no url"}]}));
        let provider = TavilySearchProvider::new(client, "k");

        assert!(provider.search("q", 3).await.is_err());
    }
}
