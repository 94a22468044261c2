//! LLM-based relevance grader

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::structured::{binary_score, decode, parse_structured};
use crate::domain::grading::{RelevanceGrade, RelevanceGrader, SimilarityScore};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponse};
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You assess whether a retrieved document is relevant to a user question. \
A document is relevant if it contains keywords or meaning related to the question; it does not need \
to answer it fully. The vector similarity score is a hint only and may be 'unknown'. \
Reply with a JSON object: {\"relevance\": \"yes\" or \"no\", \"relevance_score\": number between 0 and 1}.";

#[derive(Debug, Deserialize)]
struct RelevanceReply {
    #[serde(deserialize_with = "binary_score")]
    relevance: bool,
    relevance_score: f32,
}

impl RelevanceReply {
    fn validate(self) -> Result<Self, DomainError> {
        if !self.relevance_score.is_finite() || !(0.0..=1.0).contains(&self.relevance_score) {
            return Err(DomainError::validation(format!(
                "relevance_score {} is outside [0, 1]",
                self.relevance_score
            )));
        }
        Ok(self)
    }
}

/// Grades one document at a time with a chat model
#[derive(Debug)]
pub struct LlmRelevanceGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmRelevanceGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            max_tokens: 100,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether `response` is a reply this grader would accept
    pub fn accepts(response: &LlmResponse) -> bool {
        decode::<RelevanceReply>(response.content()).is_some_and(|reply| reply.validate().is_ok())
    }

    fn build_prompt(question: &str, document_content: &str, similarity: SimilarityScore) -> String {
        format!(
            "Retrieved document:\n\n{}\n\nVector similarity score: {}\n\nUser question: {}",
            document_content, similarity, question
        )
    }
}

#[async_trait]
impl RelevanceGrader for LlmRelevanceGrader {
    async fn grade(
        &self,
        question: &str,
        document_content: &str,
        similarity: SimilarityScore,
    ) -> Result<RelevanceGrade, DomainError> {
        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(Self::build_prompt(question, document_content, similarity))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .json_output()
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let reply = parse_structured::<RelevanceReply>("relevance grader", response.content())?
            .validate()?;

        debug!(
            relevance = reply.relevance,
            relevance_score = reply.relevance_score,
            similarity = %similarity,
            "Document graded"
        );

        Ok(RelevanceGrade {
            relevance: reply.relevance,
            relevance_score: reply.relevance_score,
        })
    }

    fn grader_name(&self) -> &'static str {
        "llm"
    }
}
