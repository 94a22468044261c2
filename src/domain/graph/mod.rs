//! Corrective RAG graph domain
//!
//! A run is an explicit finite-state machine over a handful of named nodes:
//!
//! ```text
//! RETRIEVE -> GRADE_DOCUMENTS -> WEBSEARCH -> GENERATE
//!                            \-> GENERATE
//! GENERATE --useful--------> END
//! GENERATE --not supported-> GENERATE
//! GENERATE --not useful----> WEBSEARCH -> GENERATE
//! ```
//!
//! Routing is a pure function of grader output ([`route_after_grading`],
//! [`GenerationVerdict::from_grades`]) looked up in [`TRANSITIONS`]. Retry and
//! escalation budgets are enforced by the executor, never by the routers.

mod config;
mod error;
mod executor;
mod node;
mod state;

pub use config::GraphConfig;
pub use error::GraphError;
pub use executor::GraphExecutor;
pub use node::{route_after_grading, transition, Decision, GenerationVerdict, GraphNode, TRANSITIONS};
pub use state::{AnswerPath, RunInput, RunOutput, RunState, RunStats, StepRecord};
