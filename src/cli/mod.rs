//! CLI module for Savvy RAG
//!
//! Provides subcommands:
//! - `ask`: answer one question through the corrective RAG graph

pub mod ask;

use clap::{Parser, Subcommand};

/// Savvy RAG - self-correcting retrieval-augmented question answering
#[derive(Parser)]
#[command(name = "savvy-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a question against a document set, falling back to web search
    Ask(ask::AskArgs),
}
