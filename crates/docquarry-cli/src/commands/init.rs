//! Init command

use docquarry_core::{Config, Result};

pub async fn run() -> Result<()> {
    let path = Config::default_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save()?;
    println!("Wrote starter config to {}", path.display());
    println!("Edit retrieval.content_root to point at your corpus, then run 'docquarry reindex'.");
    Ok(())
}
