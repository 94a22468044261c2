//! Corrective RAG executor implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::steps;
use crate::domain::generation::AnswerGenerator;
use crate::domain::grading::{AnswerGrader, HallucinationGrader, RelevanceGrader};
use crate::domain::graph::{
    route_after_grading, transition, AnswerPath, Decision, GenerationVerdict, GraphConfig,
    GraphError, GraphExecutor, GraphNode, RunInput, RunOutput, RunState, RunStats, StepRecord,
};
use crate::domain::web_search::WebSearchProvider;
use crate::domain::DomainError;

/// The collaborators a run calls into
#[derive(Debug, Clone)]
pub struct GraphComponents {
    pub relevance_grader: Arc<dyn RelevanceGrader>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub hallucination_grader: Arc<dyn HallucinationGrader>,
    pub answer_grader: Arc<dyn AnswerGrader>,
    pub web_search: Arc<dyn WebSearchProvider>,
}

/// Drives the corrective RAG state machine
///
/// The executor holds no per-run state, so one instance can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct CorrectiveRagExecutor {
    components: GraphComponents,
    config: GraphConfig,
}

impl CorrectiveRagExecutor {
    pub fn new(components: GraphComponents) -> Self {
        Self {
            components,
            config: GraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Execute one node and report its decision
    async fn run_node(&self, node: GraphNode, state: &mut RunState) -> Result<Decision, DomainError> {
        let components = &self.components;

        match node {
            GraphNode::Retrieve => {
                steps::retrieve(state, self.config.retrieval_k).await?;
                Ok(Decision::Continue)
            }
            GraphNode::GradeDocuments => {
                steps::grade_documents(
                    components.relevance_grader.as_ref(),
                    state,
                    self.config.grading_concurrency,
                )
                .await?;
                Ok(route_after_grading(state.take_web_search()))
            }
            GraphNode::WebSearch => {
                steps::web_search(
                    components.web_search.as_ref(),
                    state,
                    self.config.web_search_results,
                )
                .await?;
                Ok(Decision::Continue)
            }
            GraphNode::Generate => {
                steps::generate(components.generator.as_ref(), state).await?;
                let verdict = steps::grade_generation(
                    components.hallucination_grader.as_ref(),
                    components.answer_grader.as_ref(),
                    state,
                )
                .await?;
                Ok(Decision::from(verdict))
            }
            GraphNode::End => Ok(Decision::Continue),
        }
    }

    /// Run a node under the step timeout
    async fn execute_node(
        &self,
        node: GraphNode,
        state: &mut RunState,
    ) -> Result<Decision, GraphError> {
        let timeout_ms = self.config.step_timeout_ms;

        tokio::time::timeout(Duration::from_millis(timeout_ms), self.run_node(node, state))
            .await
            .map_err(|_| GraphError::Timeout { node, timeout_ms })?
            .map_err(|e| GraphError::step(node, e))
    }

    /// Charge a generation verdict against the run budgets
    fn charge_budget(
        &self,
        decision: Decision,
        state: &RunState,
        stats: &mut RunStats,
    ) -> Result<(), GraphError> {
        match decision {
            Decision::NotSupported => {
                if stats.generation_retries >= self.config.max_generation_retries {
                    return Err(self.inconclusive(GenerationVerdict::NotSupported, state, stats));
                }
                stats.generation_retries += 1;
                metrics::counter!("rag_generation_retries_total").increment(1);
                warn!(
                    retry = stats.generation_retries,
                    max = self.config.max_generation_retries,
                    "Answer not supported by the documents, regenerating"
                );
            }
            Decision::NotUseful => {
                if stats.escalations >= self.config.max_web_search_escalations {
                    return Err(self.inconclusive(GenerationVerdict::NotUseful, state, stats));
                }
                stats.escalations += 1;
                warn!(
                    escalation = stats.escalations,
                    max = self.config.max_web_search_escalations,
                    "Answer does not address the question, escalating to web search"
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn inconclusive(
        &self,
        verdict: GenerationVerdict,
        state: &RunState,
        stats: &RunStats,
    ) -> GraphError {
        warn!(
            verdict = %verdict,
            attempts = stats.generations,
            "Budget exhausted without an accepted answer"
        );
        GraphError::Inconclusive {
            verdict,
            attempts: stats.generations,
            last_generation: state.generation.clone(),
        }
    }

    async fn drive(
        &self,
        run_id: Uuid,
        input: RunInput,
        start: Instant,
    ) -> Result<RunOutput, GraphError> {
        input.validate()?;

        let mut state = RunState::from_input(input);
        let mut node = GraphNode::Retrieve;
        let mut steps: Vec<StepRecord> = Vec::new();
        let mut stats = RunStats::default();

        while !node.is_terminal() {
            if steps.len() >= self.config.max_steps {
                return Err(GraphError::StepLimitExceeded {
                    max_steps: self.config.max_steps,
                });
            }

            info!(node = %node, "Entering node");
            let step_start = Instant::now();

            let decision = self.execute_node(node, &mut state).await?;

            match node {
                GraphNode::Generate => stats.generations += 1,
                GraphNode::WebSearch => {
                    stats.web_searches += 1;
                    let trigger = match steps.last().map(|s| s.node) {
                        Some(GraphNode::Generate) => "not_useful",
                        _ => "irrelevant_documents",
                    };
                    metrics::counter!("rag_web_search_total", "trigger" => trigger).increment(1);
                }
                _ => {}
            }

            steps.push(StepRecord {
                node,
                decision,
                elapsed_ms: step_start.elapsed().as_millis() as u64,
            });

            self.charge_budget(decision, &state, &mut stats)?;

            let next = transition(node, decision)
                .ok_or(GraphError::MissingTransition { node, decision })?;
            info!(node = %node, decision = %decision, next = %next, "Routing");
            node = next;
        }

        let generation = state.generation.take().ok_or(GraphError::MissingTransition {
            node: GraphNode::End,
            decision: Decision::Useful,
        })?;
        let used_web_search = stats.web_searches > 0;
        let execution_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            steps = steps.len(),
            documents = state.documents.len(),
            used_web_search,
            execution_time_ms,
            "Run accepted"
        );

        Ok(RunOutput {
            run_id,
            question: state.question,
            documents: state.documents,
            generation,
            used_web_search,
            path: if used_web_search {
                AnswerPath::WebSearchAugmented
            } else {
                AnswerPath::Direct
            },
            steps,
            stats,
            execution_time_ms,
        })
    }
}

#[async_trait]
impl GraphExecutor for CorrectiveRagExecutor {
    async fn run(&self, input: RunInput) -> Result<RunOutput, GraphError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let span = info_span!("rag_run", run_id = %run_id, question = %input.question.trim());

        let result = self.drive(run_id, input, start).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "accepted",
            Err(e) => e.outcome(),
        };
        metrics::counter!("rag_runs_total", "outcome" => outcome).increment(1);
        metrics::histogram!("rag_run_duration_seconds").record(start.elapsed().as_secs_f64());

        result
    }
}
