//! Domain layer - pure types and traits for the corrective RAG core

pub mod cache;
pub mod chat;
pub mod document;
pub mod error;
pub mod generation;
pub mod grading;
pub mod graph;
pub mod llm;
pub mod retrieval;
pub mod web_search;

pub use cache::{Cache, CacheExt, CacheKeyGenerator, CacheKeyParams, DefaultKeyGenerator};
pub use chat::ChatTurn;
pub use document::{Document, DocumentMetadata};
pub use error::DomainError;
pub use generation::{
    render_chat_history, render_context, AnswerGenerator, HISTORY_WINDOW,
    NO_PREVIOUS_CONVERSATION,
};
pub use grading::{
    AnswerGrade, AnswerGrader, GroundingGrade, HallucinationGrader, RelevanceGrade,
    RelevanceGrader, SimilarityScore,
};
pub use graph::{
    route_after_grading, transition, AnswerPath, Decision, GenerationVerdict, GraphConfig,
    GraphError, GraphExecutor, GraphNode, RunInput, RunOutput, RunState, RunStats, StepRecord,
    TRANSITIONS,
};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, LlmResponseFormat,
    Message, MessageRole, Usage,
};
pub use retrieval::Retriever;
pub use web_search::{WebSearchProvider, WebSearchResult};
