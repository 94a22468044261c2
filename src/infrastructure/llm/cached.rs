//! Response cache in front of an LLM provider

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheExt, CacheKeyGenerator, CacheKeyParams, DefaultKeyGenerator};
use crate::domain::{DomainError, LlmProvider, LlmRequest, LlmResponse};

const NAMESPACE: &str = "llm:responses";

/// Decides whether a response may be stored
pub type ResponseCheck = fn(&LlmResponse) -> bool;

/// Wraps a provider and serves repeated identical requests from a cache
///
/// Keys are built only from the request itself (model, messages, temperature,
/// response format), never from run identity, so concurrent runs can share
/// entries safely. Cache failures degrade to a direct provider call.
#[derive(Debug)]
pub struct CachedLlmProvider {
    inner: Arc<dyn LlmProvider>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    key_generator: DefaultKeyGenerator,
    response_check: Option<ResponseCheck>,
}

impl CachedLlmProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            key_generator: DefaultKeyGenerator::new(),
            response_check: None,
        }
    }

    /// Only responses passing `check` are cached; the rest are returned uncached
    pub fn with_response_check(mut self, check: ResponseCheck) -> Self {
        self.response_check = Some(check);
        self
    }

    pub fn cache_key(&self, model: &str, request: &LlmRequest) -> String {
        let messages =
            serde_json::to_string(&request.messages).unwrap_or_else(|_| "[]".to_string());

        let mut params = CacheKeyParams::new(model)
            .with_component("messages", messages)
            .with_component("format", format!("{:?}", request.response_format));

        if let Some(temp) = request.temperature {
            params = params.with_component("temperature", format!("{:.2}", temp));
        }

        if let Some(tokens) = request.max_tokens {
            params = params.with_component("max_tokens", tokens.to_string());
        }

        self.key_generator
            .generate_with_namespace(NAMESPACE, &params)
    }
}

#[async_trait]
impl LlmProvider for CachedLlmProvider {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let key = self.cache_key(model, &request);

        match self.cache.get::<LlmResponse>(&key).await {
            Ok(Some(response)) => {
                debug!(key = %key, "LLM cache hit");
                metrics::counter!("rag_llm_cache_total", "result" => "hit").increment(1);
                return Ok(response);
            }
            Ok(None) => {
                metrics::counter!("rag_llm_cache_total", "result" => "miss").increment(1);
            }
            Err(e) => warn!(error = %e, "LLM cache lookup failed"),
        }

        let response = self.inner.chat(model, request).await?;

        if self.response_check.is_some_and(|check| !check(&response)) {
            debug!(key = %key, "LLM response failed validation, not cached");
            metrics::counter!("rag_llm_cache_total", "result" => "rejected").increment(1);
            return Ok(response);
        }

        if let Err(e) = self.cache.set(&key, &response, self.ttl).await {
            warn!(error = %e, "Failed to store LLM response in cache");
        }

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::llm::MockLlmProvider;
    use crate::infrastructure::cache::InMemoryCache;

    fn grading_request(doc: &str) -> LlmRequest {
        LlmRequest::builder()
            .system("grade")
            .user(doc)
            .temperature(0.1)
            .json_output()
            .build()
    }

    #[tokio::test]
    async fn test_identical_requests_hit_cache() {
        let inner = Arc::new(MockLlmProvider::new("mock").with_replies(["first", "second"]));
        let provider = CachedLlmProvider::new(
            inner.clone(),
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(60),
        );

        let a = provider.chat("m", grading_request("doc")).await.unwrap();
        let b = provider.chat("m", grading_request("doc")).await.unwrap();

        assert_eq!(a.content(), "first");
        assert_eq!(b.content(), "first");
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_different_inputs_miss_cache() {
        let inner = Arc::new(MockLlmProvider::new("mock").with_replies(["first", "second", "third"]));
        let provider = CachedLlmProvider::new(
            inner.clone(),
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(60),
        );

        provider.chat("m", grading_request("doc")).await.unwrap();
        provider.chat("m", grading_request("other doc")).await.unwrap();
        provider.chat("other-model", grading_request("doc")).await.unwrap();

        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_key_depends_on_temperature_and_format() {
        let provider = CachedLlmProvider::new(
            Arc::new(MockLlmProvider::new("mock")),
            Arc::new(MockCache::new()),
            Duration::from_secs(60),
        );

        let base = provider.cache_key("m", &grading_request("doc"));
        let warmer = LlmRequest::builder()
            .system("grade")
            .user("doc")
            .temperature(0.7)
            .json_output()
            .build();
        let text = LlmRequest::builder()
            .system("grade")
            .user("doc")
            .temperature(0.1)
            .build();

        assert!(base.starts_with("llm:responses:"));
        assert_ne!(base, provider.cache_key("m", &warmer));
        assert_ne!(base, provider.cache_key("m", &text));
    }

    #[tokio::test]
    async fn test_broken_cache_falls_through() {
        let inner = Arc::new(MockLlmProvider::new("mock").with_reply("fresh"));
        let provider = CachedLlmProvider::new(
            inner.clone(),
            Arc::new(MockCache::new().with_error("unavailable")),
            Duration::from_secs(60),
        );

        let response = provider.chat("m", grading_request("doc")).await.unwrap();

        assert_eq!(response.content(), "fresh");
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_errors_are_not_cached() {
        let inner = Arc::new(MockLlmProvider::new("mock").with_error("boom"));
        let cache = Arc::new(MockCache::new());
        let provider =
            CachedLlmProvider::new(inner.clone(), cache.clone(), Duration::from_secs(60));

        assert!(provider.chat("m", grading_request("doc")).await.is_err());
        assert_eq!(cache.entry_count(), 0);
    }

    fn is_json(response: &LlmResponse) -> bool {
        serde_json::from_str::<serde_json::Value>(response.content()).is_ok()
    }

    #[tokio::test]
    async fn test_rejected_responses_are_not_cached() {
        let inner = Arc::new(
            MockLlmProvider::new("mock").with_replies(["not json", r#"{"ok": true}"#]),
        );
        let cache = Arc::new(MockCache::new());
        let provider = CachedLlmProvider::new(inner.clone(), cache.clone(), Duration::from_secs(60))
            .with_response_check(is_json);

        let first = provider.chat("m", grading_request("doc")).await.unwrap();
        assert_eq!(first.content(), "not json");
        assert_eq!(cache.entry_count(), 0);

        let second = provider.chat("m", grading_request("doc")).await.unwrap();
        let third = provider.chat("m", grading_request("doc")).await.unwrap();

        assert_eq!(second.content(), r#"{"ok": true}"#);
        assert_eq!(third.content(), r#"{"ok": true}"#);
        assert_eq!(inner.call_count(), 2);
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn test_key_embeds_the_full_prompt() {
        let provider = CachedLlmProvider::new(
            Arc::new(MockLlmProvider::new("mock")),
            Arc::new(MockCache::new()),
            Duration::from_secs(60),
        );

        let key = provider.cache_key("m", &grading_request("Vector databases store embeddings."));
        assert!(key.contains("Vector databases store embeddings."));
        assert!(key.contains("grade"));
    }
}
