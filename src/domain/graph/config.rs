//! Run budgets and sizes

use serde::{Deserialize, Serialize};

/// Configuration for graph execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Documents requested from a scoring retriever when the caller gives no `top_k`
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    /// Results appended per web search
    #[serde(default = "default_web_search_results")]
    pub web_search_results: usize,
    /// Re-generations allowed after a "not supported" verdict, per run
    #[serde(default = "default_max_generation_retries")]
    pub max_generation_retries: u32,
    /// Web search escalations allowed after a "not useful" verdict, per run
    #[serde(default = "default_max_web_search_escalations")]
    pub max_web_search_escalations: u32,
    /// Absolute guard on executed nodes
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Upper bound for a single node, in milliseconds
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,
    /// Documents graded concurrently
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,
}

fn default_retrieval_k() -> usize {
    4
}

fn default_web_search_results() -> usize {
    3
}

fn default_max_generation_retries() -> u32 {
    3
}

fn default_max_web_search_escalations() -> u32 {
    2
}

fn default_max_steps() -> usize {
    25
}

fn default_step_timeout_ms() -> u64 {
    60_000
}

fn default_grading_concurrency() -> usize {
    4
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            retrieval_k: default_retrieval_k(),
            web_search_results: default_web_search_results(),
            max_generation_retries: default_max_generation_retries(),
            max_web_search_escalations: default_max_web_search_escalations(),
            max_steps: default_max_steps(),
            step_timeout_ms: default_step_timeout_ms(),
            grading_concurrency: default_grading_concurrency(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k.max(1);
        self
    }

    pub fn with_web_search_results(mut self, results: usize) -> Self {
        self.web_search_results = results;
        self
    }

    pub fn with_max_generation_retries(mut self, retries: u32) -> Self {
        self.max_generation_retries = retries;
        self
    }

    pub fn with_max_web_search_escalations(mut self, escalations: u32) -> Self {
        self.max_web_search_escalations = escalations;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_step_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.step_timeout_ms = timeout_ms;
        self
    }

    pub fn with_grading_concurrency(mut self, concurrency: usize) -> Self {
        self.grading_concurrency = concurrency.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.retrieval_k, 4);
        assert_eq!(config.web_search_results, 3);
        assert_eq!(config.max_generation_retries, 3);
        assert_eq!(config.max_web_search_escalations, 2);
        assert_eq!(config.max_steps, 25);
        assert_eq!(config.step_timeout_ms, 60_000);
        assert_eq!(config.grading_concurrency, 4);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: GraphConfig =
            serde_json::from_str(r#"{"max_generation_retries": 1}"#).unwrap();
        assert_eq!(config.max_generation_retries, 1);
        assert_eq!(config.retrieval_k, 4);
    }

    #[test]
    fn test_builders_clamp_zero_sizes() {
        let config = GraphConfig::new()
            .with_retrieval_k(0)
            .with_grading_concurrency(0)
            .with_max_steps(10);

        assert_eq!(config.retrieval_k, 1);
        assert_eq!(config.grading_concurrency, 1);
        assert_eq!(config.max_steps, 10);
    }
}
