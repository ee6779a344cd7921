//! External capability interfaces
//!
//! Embedding and reranking are consumed, not built: the traits here define
//! the data flow and control contracts, with HTTP-backed implementations for
//! OpenAI-compatible inference services.

mod http;

pub use http::{HttpEmbedder, HttpReranker};

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Passage reranking trait. Scores are query-aware relevance, higher = more
/// relevant; no fixed range is guaranteed.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score (query, passage) pairs for a batch of documents
    async fn rerank(&self, query: &str, documents: &[RerankDocument])
        -> Result<Vec<RerankResult>>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Passage submitted for reranking
#[derive(Debug, Clone)]
pub struct RerankDocument {
    pub id: String,
    pub text: String,
}

/// Reranking score for one passage
#[derive(Debug, Clone)]
pub struct RerankResult {
    pub id: String,
    pub score: f64,
}
