//! Run-level errors

use thiserror::Error;

use super::node::{Decision, GenerationVerdict, GraphNode};
use crate::domain::DomainError;

/// Errors that end a run without an accepted answer
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A component call failed or returned malformed output
    #[error("Step '{node}' failed: {source}")]
    StepExecution {
        node: GraphNode,
        #[source]
        source: DomainError,
    },

    /// Retry or escalation budget exhausted before an answer was accepted
    #[error("Run inconclusive after {attempts} generation attempts (last verdict: {verdict})")]
    Inconclusive {
        verdict: GenerationVerdict,
        attempts: u32,
        last_generation: Option<String>,
    },

    #[error("Step limit of {max_steps} exceeded")]
    StepLimitExceeded { max_steps: usize },

    #[error("Timeout in step '{node}' after {timeout_ms}ms")]
    Timeout { node: GraphNode, timeout_ms: u64 },

    #[error("No transition from '{node}' on '{decision}'")]
    MissingTransition { node: GraphNode, decision: Decision },
}

impl GraphError {
    pub fn step(node: GraphNode, source: DomainError) -> Self {
        Self::StepExecution { node, source }
    }

    /// Label used for the `outcome` metric
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::StepExecution { .. } => "step_failed",
            Self::Inconclusive { .. } => "inconclusive",
            Self::StepLimitExceeded { .. } => "step_limit",
            Self::Timeout { .. } => "timeout",
            Self::MissingTransition { .. } => "missing_transition",
        }
    }
}
