//! Infrastructure layer - External service implementations

pub mod cache;
pub mod generation;
pub mod grading;
pub mod graph;
pub mod llm;
pub mod logging;
pub mod retrieval;
pub mod web_search;
