//! Docquarry CLI
//!
//! Administrative interface for the hybrid document retrieval engine:
//! reindex the corpus, run queries, inspect index status.

use clap::Parser;
use docquarry_core::{
    Config, HttpEmbedder, HttpReranker, HybridRetriever, IndexLifecycleManager, IndexStore,
};
use std::sync::Arc;

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> docquarry_core::Result<()> {
    // Init only touches the config file; skip opening the store.
    if matches!(cli.command, Commands::Init) {
        return commands::init::run().await;
    }

    let config = Config::load()?;

    // Open the index store (use DOCQUARRY_INDEX env var if set)
    let store_path = std::env::var("DOCQUARRY_INDEX")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| IndexStore::default_path());
    let store = Arc::new(IndexStore::open(&store_path)?);

    let embedder = Arc::new(HttpEmbedder::new(config.embedding_service.clone())?);

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Reindex(args) => {
            let manager =
                IndexLifecycleManager::new(store.clone(), embedder, config.retrieval.clone())?;
            commands::reindex::run(args, &manager).await
        }
        Commands::Query(args) => {
            let reranker = Arc::new(HttpReranker::new(config.embedding_service.clone())?);
            let manager = IndexLifecycleManager::new(
                store.clone(),
                embedder.clone(),
                config.retrieval.clone(),
            )?;
            let retriever = HybridRetriever::new(store, embedder, reranker);
            commands::query::run(args, &manager, &retriever, &config.retrieval, cli.format).await
        }
        Commands::Status => {
            commands::status::run(&store, &config.retrieval, cli.format).await
        }
    }
}
