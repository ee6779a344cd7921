//! Retrieval pipeline
//!
//! Provides:
//! - In-memory BM25 lexical search over the collection's chunk snapshot
//! - Hybrid retrieval fusing vector and lexical results with reranking

mod hybrid;
mod lexical;

pub use hybrid::{HybridRetriever, RetrievalResult, RetrievedContext};
pub use lexical::LexicalIndex;
