//! LLM provider implementations

mod cached;
mod factory;
mod http_client;
mod openai;

pub use cached::{CachedLlmProvider, ResponseCheck};
pub use factory::{LlmProviderConfig, LlmProviderFactory};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
