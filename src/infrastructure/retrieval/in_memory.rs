//! In-memory retriever for development and testing

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::domain::document::Document;
use crate::domain::retrieval::Retriever;
use crate::domain::DomainError;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how",
        "in", "is", "it", "of", "on", "or", "the", "to", "what", "when", "where", "which", "who",
        "why", "with",
    ]
    .into_iter()
    .collect()
});

fn terms(text: &str) -> HashSet<String> {
    TOKEN
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .collect()
}

/// Share of the query's terms found in the document, in [0, 1]
fn term_overlap(query_terms: &HashSet<String>, content: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let doc_terms = terms(content);
    let shared = query_terms.intersection(&doc_terms).count();
    shared as f32 / query_terms.len() as f32
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentEntry {
    Text(String),
    Document(Document),
}

/// Ranks stored documents by term overlap with the query
///
/// Scored search can be switched off to behave like a backend without scores.
#[derive(Debug, Clone)]
pub struct InMemoryRetriever {
    documents: Arc<Vec<Document>>,
    scoring: bool,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Arc::new(documents),
            scoring: true,
        }
    }

    pub fn with_scoring(mut self, scoring: bool) -> Self {
        self.scoring = scoring;
        self
    }

    /// Load a JSON array of documents or plain strings
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::retrieval(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let entries: Vec<DocumentEntry> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::retrieval(format!("Invalid document file {}: {}", path.display(), e))
        })?;

        let documents = entries
            .into_iter()
            .map(|entry| match entry {
                DocumentEntry::Text(text) => Document::new(text),
                DocumentEntry::Document(doc) => doc,
            })
            .collect();

        Ok(Self::with_documents(documents))
    }

    fn rank(&self, query: &str, k: usize) -> Vec<(Document, f32)> {
        let query_terms = terms(query);

        let mut scored: Vec<(Document, f32)> = self
            .documents
            .iter()
            .map(|doc| (doc.clone(), term_overlap(&query_terms, &doc.content)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    fn supports_scoring(&self) -> bool {
        self.scoring
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, DomainError> {
        if !self.scoring {
            return Err(DomainError::unsupported("scored similarity search"));
        }

        let results = self.rank(query, k);
        debug!(query = %query, k, hits = results.len(), "In-memory scored search");
        Ok(results)
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, DomainError> {
        Ok(self.rank(query, k).into_iter().map(|(doc, _)| doc).collect())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}
