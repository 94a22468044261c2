//! Cache key generation

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
///
/// Components live in a `BTreeMap` so the key does not depend on insertion order.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Primary identifier (model name for LLM responses)
    pub primary: String,
    pub components: BTreeMap<String, String>,
}

impl CacheKeyParams {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }
}

/// Joins the primary identifier and every component into the key verbatim
///
/// No digest is taken, so the whole request is part of the key.
#[derive(Debug, Clone, Default)]
pub struct DefaultKeyGenerator;

impl DefaultKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for DefaultKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        std::iter::once(params.primary.clone())
            .chain(
                params
                    .components
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v)),
            )
            .collect::<Vec<_>>()
            .join(":")
    }
}
