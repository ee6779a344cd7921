//! Reindex command

use crate::app::ReindexArgs;
use docquarry_core::{IndexLifecycleManager, Result};

pub async fn run(args: ReindexArgs, manager: &IndexLifecycleManager) -> Result<()> {
    if args.force {
        println!("Rebuilding index from scratch...");
    } else {
        println!("Loading index (rebuilding if needed)...");
    }

    let collection = manager.ensure(args.force).await?;

    if collection.is_empty() {
        println!(
            "Collection '{}' is empty: no supported documents found in the corpus",
            collection.name
        );
    } else {
        println!(
            "Collection '{}' ready: {} chunks ({} dimensions)",
            collection.name, collection.chunk_count, collection.dimensions
        );
    }
    Ok(())
}
