//! Configuration management

use crate::error::{DocQuarryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Retrieval and indexing configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Embedding/rerank service configuration
    #[serde(default)]
    pub embedding_service: EmbeddingServiceConfig,
}

/// Retrieval and indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Root directory of the document corpus
    pub content_root: PathBuf,

    /// Name of the persisted vector collection
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk overlap in characters (must be < chunk_size)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Candidates fetched per search signal before fusion
    #[serde(default = "default_initial_k")]
    pub initial_k: usize,

    /// Results returned after reranking
    #[serde(default = "default_final_k")]
    pub final_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("corpora"),
            collection_name: default_collection_name(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            initial_k: default_initial_k(),
            final_k: default_final_k(),
        }
    }
}

impl RetrievalConfig {
    /// Validate chunking and retrieval parameters, fail fast on misconfiguration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(DocQuarryError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(DocQuarryError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.initial_k == 0 || self.final_k == 0 {
            return Err(DocQuarryError::Config(
                "initial_k and final_k must be greater than zero".to_string(),
            ));
        }
        if self.collection_name.is_empty() {
            return Err(DocQuarryError::Config(
                "collection_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_collection_name() -> String {
    "vector_collection".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_initial_k() -> usize {
    10
}

fn default_final_k() -> usize {
    3
}

/// Embedding and rerank service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embeddings service
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimensions (falls back to 384 if not specified)
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Base URL for the rerank service (falls back to main URL if not specified)
    #[serde(default)]
    pub rerank_url: Option<String>,

    /// Model name for reranking
    #[serde(default = "default_rerank_model")]
    pub rerank_model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl EmbeddingServiceConfig {
    /// Get the rerank URL (falls back to main URL if not specified)
    pub fn rerank_url(&self) -> &str {
        self.rerank_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DOCQUARRY_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_embedding_model(),
            dimensions: std::env::var("DOCQUARRY_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            rerank_url: std::env::var("DOCQUARRY_RERANK_URL").ok(),
            rerank_model: default_rerank_model(),
            api_key: std::env::var("DOCQUARRY_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_embedding_model() -> String {
    std::env::var("DOCQUARRY_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_rerank_model() -> String {
    std::env::var("DOCQUARRY_RERANK_MODEL")
        .unwrap_or_else(|_| "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string())
}

fn default_timeout() -> u64 {
    120
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a path, falling back to defaults when it is absent
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.retrieval.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to a path, creating parent directories as needed
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
