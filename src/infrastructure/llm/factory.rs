use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::http_client::HttpClient;
use super::openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};
use crate::domain::{DomainError, LlmProvider};

/// Which chat endpoint to talk to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmProviderConfig {
    /// api.openai.com, requires an API key
    #[default]
    OpenAi,
    /// Any server exposing `/v1/chat/completions` (vLLM, Ollama, LiteLLM, ...)
    OpenAiCompatible { base_url: String },
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(
        config: &LlmProviderConfig,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(timeout)?;

        match config {
            LlmProviderConfig::OpenAi => {
                let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    DomainError::configuration("OpenAI provider requires an API key")
                })?;
                Ok(Arc::new(OpenAiProvider::with_base_url(
                    http_client,
                    api_key,
                    DEFAULT_OPENAI_BASE_URL,
                )))
            }
            LlmProviderConfig::OpenAiCompatible { base_url } => {
                if base_url.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "OpenAI-compatible provider requires a base_url",
                    ));
                }
                Ok(Arc::new(OpenAiProvider::with_base_url(
                    http_client,
                    api_key.unwrap_or_default(),
                    base_url.as_str(),
                )))
            }
        }
    }
}
