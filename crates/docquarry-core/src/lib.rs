//! DocQuarry Core Library
//!
//! Retrieval engine for answering questions against a private document corpus.
//!
//! # Features
//! - Document loading and fixed-window chunking (PDF, DOCX, TXT)
//! - Persistent named vector collections with cosine similarity search
//! - Rebuild-aware index lifecycle management with corruption recovery
//! - Per-query in-memory BM25 lexical search
//! - Hybrid retrieval with cross-encoder reranking

pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod providers;
pub mod retrieval;

pub use config::{Config, EmbeddingServiceConfig, RetrievalConfig};
pub use error::{DocQuarryError, Error, Result};
pub use index::{Collection, IndexLifecycleManager, IndexState, IndexStore, ScoredChunk};
pub use loader::{
    chunk_documents, load_documents, Chunk, ChunkMetadata, DocumentFormat, SourceDocument,
};
pub use providers::{
    Embedder, HttpEmbedder, HttpReranker, RerankDocument, RerankResult, Reranker,
};
pub use retrieval::{HybridRetriever, LexicalIndex, RetrievalResult, RetrievedContext};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "docquarry";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "docquarry";
