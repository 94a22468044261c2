use async_trait::async_trait;

use super::error::GraphError;
use super::state::{RunInput, RunOutput};

/// Runs one question through the graph
///
/// Runs share no mutable state; dropping the returned future abandons the run
/// between (or inside) steps without side effects.
#[async_trait]
pub trait GraphExecutor: Send + Sync + std::fmt::Debug {
    async fn run(&self, input: RunInput) -> Result<RunOutput, GraphError>;
}
