use std::path::Path;

use serde::Deserialize;

use crate::domain::graph::GraphConfig;
use crate::infrastructure::llm::LlmProviderConfig;
use crate::infrastructure::web_search::{SearchDepth, DEFAULT_TAVILY_BASE_URL};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub grading: GradingConfig,
    pub web_search: WebSearchConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Chat model settings shared by the generator and the graders
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProviderConfig,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub generator: ModelConfig,
    pub document_grading: ModelConfig,
    pub answer_grounding: ModelConfig,
    pub cache: LlmCacheConfig,
}

/// One model role; unset sampling parameters keep the role's own defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Response cache for grader calls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmCacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GradingStrategy {
    #[default]
    Llm,
    Threshold,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub strategy: GradingStrategy,
    /// Used by the threshold strategy
    pub similarity_threshold: f32,
    /// `false` when the retriever reports distances
    pub higher_is_better: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub base_url: String,
    /// Falls back to `TAVILY_API_KEY`
    pub api_key: Option<String>,
    pub max_results: usize,
    pub search_depth: SearchDepth,
    pub timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderConfig::default(),
            api_key: None,
            timeout_secs: 60,
            generator: ModelConfig::default(),
            document_grading: ModelConfig::default(),
            answer_grounding: ModelConfig::default(),
            cache: LlmCacheConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for LlmCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            max_capacity: 10_000,
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            strategy: GradingStrategy::default(),
            similarity_threshold: 0.5,
            higher_is_better: true,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            api_key: None,
            max_results: 3,
            search_depth: SearchDepth::default(),
            timeout_secs: 30,
        }
    }
}

fn resolve_key(configured: Option<&str>, fallback: Option<String>) -> Option<String> {
    configured
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or(fallback.filter(|k| !k.trim().is_empty()))
}

impl AppConfig {
    /// Load `config/default`, `config/local` and `APP__*` environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join("local")).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = config.try_deserialize()?;
        // The graph section carries its own results setting; keep both in step
        app.graph.web_search_results = app.web_search.max_results;
        Ok(app)
    }

    pub fn llm_api_key(&self) -> Option<String> {
        resolve_key(self.llm.api_key.as_deref(), std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn web_search_api_key(&self) -> Option<String> {
        resolve_key(
            self.web_search.api_key.as_deref(),
            std::env::var("TAVILY_API_KEY").ok(),
        )
    }
}
