//! LLM-based grounding check

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::structured::{binary_score, decode, parse_structured};
use crate::domain::document::Document;
use crate::domain::generation::render_context;
use crate::domain::grading::{GroundingGrade, HallucinationGrader};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponse};
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You assess whether an answer is grounded in and supported by a set of facts. \
Reply with a JSON object: {\"binary_score\": \"yes\"} if the answer is supported by the facts, \
{\"binary_score\": \"no\"} otherwise.";

#[derive(Debug, Deserialize)]
struct GroundingReply {
    #[serde(alias = "grounded", deserialize_with = "binary_score")]
    binary_score: bool,
}

/// Checks a generation against the evidence set with a chat model
///
/// An empty evidence set is reported as not grounded without calling the model.
#[derive(Debug)]
pub struct LlmHallucinationGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmHallucinationGrader {
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
        decode::<GroundingReply>(response.content()).is_some()
    }
}

#[async_trait]
impl HallucinationGrader for LlmHallucinationGrader {
    async fn grade(
        &self,
        documents: &[Document],
        generation: &str,
    ) -> Result<GroundingGrade, DomainError> {
        if documents.is_empty() {
            debug!("No evidence to ground the answer in");
            return Ok(GroundingGrade { grounded: false });
        }

        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(format!(
                "Set of facts:\n\n{}\n\nAnswer: {}",
                render_context(documents),
                generation
            ))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .json_output()
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let reply: GroundingReply = parse_structured("hallucination grader", response.content())?;

        debug!(grounded = reply.binary_score, documents = documents.len(), "Generation grounding graded");

        Ok(GroundingGrade {
            grounded: reply.binary_score,
        })
    }
}
