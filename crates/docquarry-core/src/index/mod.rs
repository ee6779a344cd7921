//! Index storage and lifecycle management
//!
//! Provides:
//! - SQLite-backed named vector collections (embeddings as f32 BLOBs)
//! - Cosine similarity search computed in Rust
//! - A state machine driving load / rebuild / cleanup over one collection

mod lifecycle;
mod store;

pub use lifecycle::{IndexLifecycleManager, IndexState};
pub use store::{
    bytes_to_embedding, cosine_similarity, embedding_to_bytes, hash_content, Collection,
    IndexStore, ScoredChunk,
};
