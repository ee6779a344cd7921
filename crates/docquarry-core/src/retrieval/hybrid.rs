//! Hybrid retrieval with reranking
//!
//! Fuses vector-similarity and BM25 candidates, deduplicates by exact
//! content, reranks the union with a cross-encoder, and returns the top-N
//! with serialized provenance. Each stage failure is a distinct error kind
//! and aborts the whole call; there is no degraded partial fallback.

use crate::error::{DocQuarryError, Result};
use crate::index::{Collection, IndexStore};
use crate::loader::Chunk;
use crate::providers::{Embedder, RerankDocument, Reranker};
use crate::retrieval::LexicalIndex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One retrieved passage with provenance. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub content: String,
    /// Human-readable filename suitable for citation display
    pub source_name: String,
    pub relevance_score: f64,
    /// 1-based position in the final ranking
    pub rank: usize,
}

/// Output of a retrieval call: formatted context plus structured chunks
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub context: String,
    pub chunks: Vec<RetrievalResult>,
}

/// Hybrid retriever over one collection snapshot
pub struct HybridRetriever {
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
}

impl HybridRetriever {
    pub fn new(
        store: Arc<IndexStore>,
        embedder: Arc<dyn Embedder>,
        reranker: Arc<dyn Reranker>,
    ) -> Self {
        Self {
            store,
            embedder,
            reranker,
        }
    }

    /// Retrieve the top `final_k` passages for a query.
    ///
    /// The caller passes the collection handle explicitly; concurrent calls
    /// share only that read-only snapshot and are safe to run in parallel.
    pub async fn retrieve(
        &self,
        collection: &Collection,
        query: &str,
        initial_k: usize,
        final_k: usize,
    ) -> Result<RetrievedContext> {
        // 1. Vector search (semantic)
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| DocQuarryError::SemanticSearchFailed(e.to_string()))?;
        let vector_hits = self
            .store
            .similarity_search(&collection.name, &query_embedding, initial_k)
            .map_err(|e| DocQuarryError::SemanticSearchFailed(e.to_string()))?;
        tracing::debug!("Vector search retrieved {} chunks", vector_hits.len());

        // 2. Keyword search (lexical), over the same persisted snapshot
        let corpus = self
            .store
            .all_chunks(&collection.name)
            .map_err(|e| DocQuarryError::LexicalSearchFailed(e.to_string()))?;
        let lexical_index = LexicalIndex::build(corpus);
        let lexical_hits = lexical_index.score(query, initial_k);
        tracing::debug!(
            "Lexical search retrieved {} of {} chunks",
            lexical_hits.len(),
            lexical_index.len()
        );

        // 3. Union and deduplicate by exact content, first occurrence wins
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<Chunk> = Vec::new();
        for chunk in vector_hits
            .into_iter()
            .map(|s| s.chunk)
            .chain(lexical_hits.into_iter().map(|(chunk, _)| chunk))
        {
            if seen.insert(chunk.content.clone()) {
                candidates.push(chunk);
            }
        }
        tracing::debug!("{} unique chunks after deduplication", candidates.len());

        // 4. Rerank the union
        let documents: Vec<RerankDocument> = candidates
            .iter()
            .enumerate()
            .map(|(i, chunk)| RerankDocument {
                id: i.to_string(),
                text: chunk.content.clone(),
            })
            .collect();

        let reranked = self
            .reranker
            .rerank(query, &documents)
            .await
            .map_err(|e| DocQuarryError::RerankFailed(e.to_string()))?;

        let scores: HashMap<&str, f64> = reranked
            .iter()
            .map(|r| (r.id.as_str(), r.score))
            .collect();

        let mut ranked: Vec<(Chunk, f64)> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let score = scores
                    .get(i.to_string().as_str())
                    .copied()
                    .unwrap_or(f64::NEG_INFINITY);
                (chunk, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(final_k);

        // 5. Serialize results in final rank order
        let chunks: Vec<RetrievalResult> = ranked
            .iter()
            .enumerate()
            .map(|(i, (chunk, score))| RetrievalResult {
                content: chunk.content.clone(),
                source_name: chunk.metadata.file_name.clone(),
                relevance_score: *score,
                rank: i + 1,
            })
            .collect();

        let context = chunks
            .iter()
            .map(|c| format!("Source: {}\nContent: {}", c.source_name, c.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(RetrievedContext { context, chunks })
    }
}
