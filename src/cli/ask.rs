//! Ask command - runs one question through the graph

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::chat::ChatTurn;
use crate::domain::graph::{AnswerPath, GraphExecutor, RunInput, RunOutput};
use crate::infrastructure::logging;
use crate::infrastructure::retrieval::InMemoryRetriever;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    #[arg(short, long)]
    pub question: String,

    /// JSON array of documents (plain strings or `{content, metadata}` objects)
    #[arg(short, long)]
    pub documents: Option<PathBuf>,

    /// JSON array of prior turns: `[{"role": "user", "content": "..."}]`
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Number of documents to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Retrieve without similarity scores
    #[arg(long)]
    pub plain_retriever: bool,

    /// Print the full run output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the ask command
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&(&config.logging).into());

    let executor = crate::create_executor_with_config(&config)?;

    let retriever = match &args.documents {
        Some(path) => InMemoryRetriever::from_json_file(path).await?,
        None => InMemoryRetriever::new(),
    }
    .with_scoring(!args.plain_retriever);

    let history = match &args.history {
        Some(path) => load_history(path).await?,
        None => Vec::new(),
    };

    let mut input = RunInput::new(args.question, Arc::new(retriever)).with_chat_history(history);
    if let Some(k) = args.top_k {
        input = input.with_top_k(k);
    }

    let output = executor.run(input).await?;
    info!(run_id = %output.run_id, steps = output.steps.len(), "Answer accepted");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_summary(&output));
    }

    Ok(())
}

async fn load_history(path: &Path) -> anyhow::Result<Vec<ChatTurn>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid history file {}", path.display()))
}

fn render_summary(output: &RunOutput) -> String {
    let path = match output.path {
        AnswerPath::Direct => "answered from retrieved documents",
        AnswerPath::WebSearchAugmented => "answered with web search",
    };
    let visited: Vec<&str> = output.steps.iter().map(|s| s.node.as_str()).collect();

    let mut summary = format!(
        "{}\n\nPath: {} ({})",
        output.generation.trim(),
        path,
        visited.join(" -> ")
    );

    let sources = output.sources();
    if !sources.is_empty() {
        summary.push_str("\nSources:");
        for source in sources {
            summary.push_str(&format!("\n  - {}", source.replace('\n', " - ")));
        }
    }

    summary
}
