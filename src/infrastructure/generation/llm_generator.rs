use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::document::Document;
use crate::domain::generation::{render_context, AnswerGenerator};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the retrieved context and the conversation so far to answer the question. \
Always answer in the same language as the question. \
If the context does not contain the answer, say that you don't know instead of making one up. \
Keep the answer concise.";

/// Answer generator backed by a chat model
///
/// Never wrap the provider handed to this generator in a response cache: a retry
/// after an ungrounded answer must reach the model again.
#[derive(Debug)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmAnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_prompt(question: &str, documents: &[Document], rendered_history: &str) -> String {
        format!(
            "Conversation so far:\n{}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
            rendered_history,
            render_context(documents),
            question
        )
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
        rendered_history: &str,
    ) -> Result<String, DomainError> {
        let mut builder = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(Self::build_prompt(question, documents, rendered_history))
            .temperature(self.temperature);

        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let response = self.provider.chat(&self.model, builder.build()).await?;
        let answer = response.content().trim();

        if answer.is_empty() {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                "Empty answer from model",
            ));
        }

        debug!(model = %self.model, documents = documents.len(), chars = answer.len(), "Answer generated");

        Ok(answer.to_string())
    }
}
