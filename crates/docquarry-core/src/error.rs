//! Error types for docquarry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using DocQuarryError
pub type Result<T> = std::result::Result<T, DocQuarryError>;

/// Error type alias for convenience
pub type Error = DocQuarryError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const FATAL: i32 = 4;
}

/// Main error type for docquarry
#[derive(Debug, Error)]
pub enum DocQuarryError {
    #[error("Content path not found: {0}")]
    ContentPathNotFound(PathBuf),

    #[error("Index corrupted: {0}")]
    IndexCorrupted(String),

    #[error("Index clear failed: {0}")]
    IndexClearFailed(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Semantic search failed: {0}")]
    SemanticSearchFailed(String),

    #[error("Lexical search failed: {0}")]
    LexicalSearchFailed(String),

    #[error("Rerank failed: {0}")]
    RerankFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DocQuarryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ContentPathNotFound(_) | Self::CollectionNotFound(_) => exit_codes::NOT_FOUND,
            Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::IndexClearFailed(_) => exit_codes::FATAL,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
