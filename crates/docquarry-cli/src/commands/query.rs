//! Query command

use crate::app::{OutputFormat, QueryArgs};
use docquarry_core::{HybridRetriever, IndexLifecycleManager, Result, RetrievalConfig};
use serde_json::json;

pub async fn run(
    args: QueryArgs,
    manager: &IndexLifecycleManager,
    retriever: &HybridRetriever,
    config: &RetrievalConfig,
    format: OutputFormat,
) -> Result<()> {
    let query = args.query.join(" ");
    let initial_k = args.initial_k.unwrap_or(config.initial_k);
    let final_k = args.final_k.unwrap_or(config.final_k);

    let collection = manager.ensure(false).await?;
    let result = retriever
        .retrieve(&collection, &query, initial_k, final_k)
        .await?;

    match format {
        OutputFormat::Json => {
            let chunks: Vec<_> = result
                .chunks
                .iter()
                .map(|c| {
                    json!({
                        "rank": c.rank,
                        "source": c.source_name,
                        "score": c.relevance_score,
                        "content": c.content,
                    })
                })
                .collect();
            let value = json!({
                "query": query,
                "results": chunks,
                "context": result.context,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Cli => {
            if args.context {
                println!("{}", result.context);
                return Ok(());
            }
            if result.chunks.is_empty() {
                println!("No results for '{}'", query);
                return Ok(());
            }
            for chunk in &result.chunks {
                println!(
                    "{}. {} (score: {:.4})",
                    chunk.rank, chunk.source_name, chunk.relevance_score
                );
                println!("   {}", preview(&chunk.content, 200));
                println!();
            }
        }
    }
    Ok(())
}

/// First `max_chars` characters of a passage, single line
fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
