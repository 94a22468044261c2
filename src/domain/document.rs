//! Evidence documents flowing through a run

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata carried by a document
///
/// The fields the graph reads and writes are typed; anything else a retriever
/// attaches is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Raw vector-similarity score (or distance) reported by the retriever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
    /// Relevance in [0, 1], set by the relevance grader or the web search provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f32>,
    /// Human-readable provenance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Backend-specific metadata
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A text span used as evidence for generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with empty metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_similarity_score(mut self, score: f32) -> Self {
        self.metadata.similarity_score = Some(score);
        self
    }

    pub fn with_relevance_score(mut self, score: f32) -> Self {
        self.metadata.relevance_score = Some(score);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Attach an arbitrary metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.extra.insert(key.into(), value);
        self
    }

    pub fn similarity_score(&self) -> Option<f32> {
        self.metadata.similarity_score
    }

    pub fn relevance_score(&self) -> Option<f32> {
        self.metadata.relevance_score
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.source.as_deref()
    }
}
