//! End-to-end tests for the hybrid retrieval pipeline: candidate fusion,
//! deduplication, reranking, rank ordering, and context serialization.

use async_trait::async_trait;
use docquarry_core::{
    DocQuarryError, Embedder, HybridRetriever, IndexLifecycleManager, IndexStore, RerankDocument,
    RerankResult, Reranker, Result, RetrievalConfig,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Deterministic embedder: the same text always maps to the same vector.
struct StubEmbedder {
    dims: usize,
}

impl StubEmbedder {
    fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % self.dims] += f32::from(b % 17) + 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "stub-embedder"
    }
}

/// Reranker that scores a passage by how many query tokens it contains.
struct OverlapReranker;

#[async_trait]
impl Reranker for OverlapReranker {
    async fn rerank(&self, query: &str, documents: &[RerankDocument]) -> Result<Vec<RerankResult>> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();
        Ok(documents
            .iter()
            .map(|d| {
                let text = d.text.to_lowercase();
                let score = terms.iter().filter(|t| text.contains(t.as_str())).count() as f64;
                RerankResult {
                    id: d.id.clone(),
                    score,
                }
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "overlap-reranker"
    }
}

/// Reranker that always fails, for abort-path tests.
struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[RerankDocument],
    ) -> Result<Vec<RerankResult>> {
        Err(DocQuarryError::ExternalService(
            "rerank service unavailable".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        "failing-reranker"
    }
}

fn config(content_root: &Path) -> RetrievalConfig {
    RetrievalConfig {
        content_root: content_root.to_path_buf(),
        collection_name: "test_collection".to_string(),
        chunk_size: 1000,
        chunk_overlap: 200,
        initial_k: 10,
        final_k: 3,
    }
}

/// Index every file in `root` and return the store plus collection handle.
async fn build_index(
    root: &Path,
    embedder: Arc<StubEmbedder>,
) -> (Arc<IndexStore>, docquarry_core::Collection) {
    let store = Arc::new(IndexStore::open_in_memory().unwrap());
    let mgr = IndexLifecycleManager::new(store.clone(), embedder, config(root)).unwrap();
    let collection = mgr.ensure(true).await.unwrap();
    (store, (*collection).clone())
}

#[tokio::test]
async fn test_retrieve_returns_ranked_context() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("leave.txt"),
        "Annual leave policy: employees accrue twenty days of paid leave per year.",
    )
    .unwrap();
    std::fs::write(
        root.path().join("expenses.txt"),
        "Expense reports must be filed within thirty days of travel.",
    )
    .unwrap();
    std::fs::write(
        root.path().join("office.txt"),
        "The office is open from eight until six on weekdays.",
    )
    .unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "annual leave policy", 10, 3)
        .await
        .unwrap();

    assert!(!result.chunks.is_empty());
    assert!(result.chunks.len() <= 3);
    assert_eq!(result.chunks[0].source_name, "leave.txt");
    assert_eq!(result.chunks[0].rank, 1);
    for pair in result.chunks.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
        assert_eq!(pair[1].rank, pair[0].rank + 1);
    }
}

#[tokio::test]
async fn test_context_serialization_format() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("leave.txt"), "leave policy text").unwrap();
    std::fs::write(root.path().join("remote.txt"), "remote work text").unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "leave policy", 10, 2)
        .await
        .unwrap();

    let blocks: Vec<&str> = result.context.split("\n\n").collect();
    assert_eq!(blocks.len(), result.chunks.len());
    assert!(blocks[0].starts_with("Source: leave.txt\nContent: "));
    for (block, chunk) in blocks.iter().zip(&result.chunks) {
        assert_eq!(
            *block,
            format!("Source: {}\nContent: {}", chunk.source_name, chunk.content)
        );
    }
}

#[tokio::test]
async fn test_identical_content_deduplicated() {
    let root = TempDir::new().unwrap();
    // Two files with byte-identical content produce one candidate.
    std::fs::write(root.path().join("a.txt"), "duplicated handbook passage").unwrap();
    std::fs::write(root.path().join("b.txt"), "duplicated handbook passage").unwrap();
    std::fs::write(root.path().join("c.txt"), "unrelated facilities notice").unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "handbook passage", 10, 10)
        .await
        .unwrap();

    let duplicates = result
        .chunks
        .iter()
        .filter(|c| c.content == "duplicated handbook passage")
        .count();
    assert_eq!(duplicates, 1);
}

#[tokio::test]
async fn test_lexical_candidate_survives_semantic_miss() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("leave.txt"),
        "The leave policy grants twenty days of annual leave.",
    )
    .unwrap();
    std::fs::write(root.path().join("a.txt"), "quarterly financial summary").unwrap();
    std::fs::write(root.path().join("b.txt"), "parking garage access codes").unwrap();
    std::fs::write(root.path().join("c.txt"), "cafeteria menu rotation").unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    // initial_k of 1 keeps the semantic leg from covering the whole corpus;
    // the lexical leg must still surface the term-bearing chunk.
    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "leave policy", 1, 3)
        .await
        .unwrap();

    assert!(result
        .chunks
        .iter()
        .any(|c| c.source_name == "leave.txt"));
    assert_eq!(result.chunks[0].source_name, "leave.txt");
}

#[tokio::test]
async fn test_rerank_failure_aborts_without_partial_result() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("a.txt"), "some indexed content").unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    let retriever = HybridRetriever::new(store, embedder, Arc::new(FailingReranker));
    let err = retriever
        .retrieve(&collection, "indexed content", 10, 3)
        .await
        .unwrap_err();

    assert!(matches!(err, DocQuarryError::RerankFailed(_)));
}

#[tokio::test]
async fn test_empty_collection_yields_empty_context() {
    let root = TempDir::new().unwrap();

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;
    assert!(collection.is_empty());

    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "anything at all", 10, 3)
        .await
        .unwrap();

    assert!(result.chunks.is_empty());
    assert!(result.context.is_empty());
}

#[tokio::test]
async fn test_final_k_bounds_result_size() {
    let root = TempDir::new().unwrap();
    for i in 0..6 {
        std::fs::write(
            root.path().join(format!("doc{}.txt", i)),
            format!("policy document number {} about shared topics", i),
        )
        .unwrap();
    }

    let embedder = Arc::new(StubEmbedder::new(8));
    let (store, collection) = build_index(root.path(), embedder.clone()).await;

    let retriever = HybridRetriever::new(store, embedder, Arc::new(OverlapReranker));
    let result = retriever
        .retrieve(&collection, "policy document", 10, 2)
        .await
        .unwrap();

    assert_eq!(result.chunks.len(), 2);
}
