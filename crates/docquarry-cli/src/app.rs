//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "docquarry")]
#[command(
    author,
    version,
    about = "Hybrid document retrieval over a local corpus"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config file if none exists
    Init,

    /// Build or rebuild the vector index from the configured corpus
    Reindex(ReindexArgs),

    /// Hybrid search with reranking
    Query(QueryArgs),

    /// Show index status
    Status,
}

#[derive(Args)]
pub struct ReindexArgs {
    /// Re-embed everything even when a usable index exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Search query
    pub query: Vec<String>,

    /// Candidates fetched per search signal before fusion
    #[arg(long)]
    pub initial_k: Option<usize>,

    /// Results returned after reranking
    #[arg(long)]
    pub final_k: Option<usize>,

    /// Print the serialized context block instead of the ranked list
    #[arg(long)]
    pub context: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
