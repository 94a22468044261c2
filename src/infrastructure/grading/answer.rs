//! LLM-based answer usefulness check

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::structured::{binary_score, decode, parse_structured};
use crate::domain::grading::{AnswerGrade, AnswerGrader};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponse};
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You assess whether an answer addresses and resolves a question. \
Reply with a JSON object: {\"binary_score\": \"yes\"} if it does, {\"binary_score\": \"no\"} otherwise.";

#[derive(Debug, Deserialize)]
struct AnswerReply {
    #[serde(alias = "addresses_question", deserialize_with = "binary_score")]
    binary_score: bool,
}

#[derive(Debug)]
pub struct LlmAnswerGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnswerGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 50,
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

    pub fn accepts(response: &LlmResponse) -> bool {
        decode::<AnswerReply>(response.content()).is_some()
    }
}

#[async_trait]
impl AnswerGrader for LlmAnswerGrader {
    async fn grade(&self, question: &str, generation: &str) -> Result<AnswerGrade, DomainError> {
        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(format!("Question: {}\n\nAnswer: {}", question, generation))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .json_output()
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let reply: AnswerReply = parse_structured("answer grader", response.content())?;

        debug!(addresses_question = reply.binary_score, "Generation usefulness graded");

        Ok(AnswerGrade {
            addresses_question: reply.binary_score,
        })
    }
}
