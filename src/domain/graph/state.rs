//! Run input, mutable run state and the caller-facing output

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GraphError;
use super::node::{Decision, GraphNode};
use crate::domain::chat::ChatTurn;
use crate::domain::document::Document;
use crate::domain::retrieval::Retriever;

/// What a caller supplies to start a run
#[derive(Debug, Clone)]
pub struct RunInput {
    pub question: String,
    pub retriever: Arc<dyn Retriever>,
    pub chat_history: Vec<ChatTurn>,
    /// Overrides the configured retrieval size
    pub top_k: Option<usize>,
}

impl RunInput {
    pub fn new(question: impl Into<String>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            question: question.into(),
            retriever,
            chat_history: Vec::new(),
            top_k: None,
        }
    }

    pub fn with_chat_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.chat_history = history;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if self.question.trim().is_empty() {
            return Err(GraphError::InvalidInput("question must not be blank".to_string()));
        }
        if self.top_k == Some(0) {
            return Err(GraphError::InvalidInput("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// State threaded through every node of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub question: String,
    pub documents: Vec<Document>,
    /// Latest answer; replaced on every generation
    pub generation: Option<String>,
    /// Set by grading when a document was rejected; consumed by the router
    pub web_search: bool,
    pub retriever: Arc<dyn Retriever>,
    pub chat_history: Vec<ChatTurn>,
    pub top_k: Option<usize>,
}

impl RunState {
    pub fn from_input(input: RunInput) -> Self {
        Self {
            question: input.question.trim().to_string(),
            documents: Vec::new(),
            generation: None,
            web_search: false,
            retriever: input.retriever,
            chat_history: input.chat_history,
            top_k: input.top_k,
        }
    }

    /// Read and clear the web search flag
    pub fn take_web_search(&mut self) -> bool {
        std::mem::take(&mut self.web_search)
    }
}

/// Whether the accepted answer needed web evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPath {
    Direct,
    WebSearchAugmented,
}

/// One executed node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub node: GraphNode,
    pub decision: Decision,
    pub elapsed_ms: u64,
}

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub generations: u32,
    /// Re-generations after "not supported"
    pub generation_retries: u32,
    pub web_searches: u32,
    /// Web searches triggered by "not useful"
    pub escalations: u32,
}

/// Result of an accepted run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub question: String,
    pub documents: Vec<Document>,
    pub generation: String,
    pub used_web_search: bool,
    pub path: AnswerPath,
    pub steps: Vec<StepRecord>,
    pub stats: RunStats,
    pub execution_time_ms: u64,
}

impl RunOutput {
    /// Nodes visited, in order
    pub fn visited(&self) -> Vec<GraphNode> {
        self.steps.iter().map(|s| s.node).collect()
    }

    /// Distinct document sources, in first-seen order
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for source in self.documents.iter().filter_map(Document::source) {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        sources
    }
}
