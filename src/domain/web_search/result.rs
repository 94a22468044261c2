use serde::{Deserialize, Serialize};

use crate::domain::document::Document;

/// A single hit returned by a web search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Provider-reported relevance
    pub score: f32,
}

impl WebSearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score,
        }
    }

    /// Map into an evidence document: body as content, `title\nurl` as source,
    /// provider score as relevance
    pub fn into_document(self) -> Document {
        let source = format!("{}\n{}", self.title, self.url);
        Document::new(self.content)
            .with_source(source)
            .with_relevance_score(self.score)
    }
}
