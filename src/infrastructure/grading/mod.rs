//! Grader implementations
//!
//! LLM-backed graders ask for a JSON object and parse it strictly; the
//! threshold grader decides relevance from retriever similarity alone.

mod answer;
mod hallucination;
mod relevance;
mod structured;
mod threshold;

pub use answer::LlmAnswerGrader;
pub use hallucination::LlmHallucinationGrader;
pub use relevance::LlmRelevanceGrader;
pub use structured::{decode, extract_json, parse_structured};
pub use threshold::SimilarityThresholdGrader;
