use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::document::Document;
use crate::domain::DomainError;

/// Produces a natural-language answer from evidence and conversation history
///
/// Implementations answer in the language of the question, say they do not know
/// when the documents do not support an answer, and stay concise.
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
        rendered_history: &str,
    ) -> Result<String, DomainError>;
}
