//! Status command

use crate::app::OutputFormat;
use docquarry_core::{IndexState, IndexStore, Result, RetrievalConfig};
use serde_json::json;

pub async fn run(
    store: &IndexStore,
    config: &RetrievalConfig,
    format: OutputFormat,
) -> Result<()> {
    let collection = store.load(&config.collection_name)?;
    let state = match &collection {
        Some(c) if c.is_empty() => IndexState::Empty,
        Some(_) => IndexState::Loaded,
        None => IndexState::Unknown,
    };

    match format {
        OutputFormat::Json => {
            let value = match &collection {
                Some(c) => json!({
                    "collection": c.name,
                    "state": state.to_string(),
                    "chunks": c.chunk_count,
                    "dimensions": c.dimensions,
                    "created_at": c.created_at,
                }),
                None => json!({
                    "collection": config.collection_name,
                    "state": state.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Cli => match &collection {
            Some(c) => {
                println!("Collection:  {}", c.name);
                println!("State:       {}", state);
                println!("Chunks:      {}", c.chunk_count);
                println!("Dimensions:  {}", c.dimensions);
                println!("Created:     {}", c.created_at);
            }
            None => {
                println!("Collection:  {}", config.collection_name);
                println!("State:       {} (run 'docquarry reindex')", state);
            }
        },
    }
    Ok(())
}
