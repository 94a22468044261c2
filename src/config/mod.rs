//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, GradingConfig, GradingStrategy, LlmCacheConfig, LlmConfig, LogFormat,
    LoggingConfig, ModelConfig, WebSearchConfig,
};
