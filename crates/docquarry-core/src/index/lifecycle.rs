//! Index lifecycle management
//!
//! Drives one named collection through load-existing, rebuild-from-scratch,
//! and cleanup-on-corruption. A rebuild clears then repopulates, so at most
//! one rebuild runs at a time; readers work against an immutable handle that
//! is swapped in only once a rebuild has fully committed.

use crate::config::RetrievalConfig;
use crate::error::{DocQuarryError, Result};
use crate::index::store::{Collection, IndexStore};
use crate::loader::{chunk_documents, load_documents, Chunk};
use crate::providers::Embedder;
use std::sync::{Arc, RwLock};

const EMBED_BATCH_SIZE: usize = 32;

/// Lifecycle state of the managed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Nothing known yet about the persisted collection
    Unknown,
    /// A non-empty collection is loaded and serving queries
    Loaded,
    /// The collection exists but holds no vectors (valid terminal state)
    Empty,
    /// A rebuild is in progress; readers keep their previous handle
    Rebuilding,
    /// An unrecoverable failure occurred; operator intervention required
    Failed,
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Loaded => "loaded",
            Self::Empty => "empty",
            Self::Rebuilding => "rebuilding",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Orchestrates the index store, chunking pipeline, and embedding provider
/// over a single named collection.
///
/// Rebuilds are full re-embedding passes triggered by an operator action;
/// there are no incremental/delta updates.
pub struct IndexLifecycleManager {
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    state: RwLock<IndexState>,
    current: RwLock<Option<Arc<Collection>>>,
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl IndexLifecycleManager {
    pub fn new(
        store: Arc<IndexStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            embedder,
            config,
            state: RwLock::new(IndexState::Unknown),
            current: RwLock::new(None),
            rebuild_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> IndexState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current collection handle. In-flight readers holding a
    /// previous snapshot are unaffected by a concurrent rebuild.
    pub fn current(&self) -> Option<Arc<Collection>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_state(&self, state: IndexState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn publish(&self, collection: Arc<Collection>) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(collection);
    }

    /// Load the persisted collection, rebuilding it when forced, missing,
    /// empty, or corrupted. Returns a handle to a fully committed collection.
    ///
    /// Serialized internally: concurrent `ensure` calls for the same manager
    /// run one at a time.
    pub async fn ensure(&self, force_rebuild: bool) -> Result<Arc<Collection>> {
        let _guard = self.rebuild_lock.lock().await;
        let name = self.config.collection_name.as_str();

        if !force_rebuild {
            match self.store.load(name) {
                Ok(Some(collection)) if collection.chunk_count > 0 => {
                    if collection.dimensions == self.embedder.dimensions() {
                        tracing::info!(
                            "Loaded existing collection '{}' with {} chunks",
                            name,
                            collection.chunk_count
                        );
                        let handle = Arc::new(collection);
                        self.publish(handle.clone());
                        self.set_state(IndexState::Loaded);
                        return Ok(handle);
                    }
                    tracing::warn!(
                        "Collection '{}' was built with {} dimensions but the embedder \
                         produces {}; forcing rebuild",
                        name,
                        collection.dimensions,
                        self.embedder.dimensions()
                    );
                }
                Ok(Some(_)) => {
                    tracing::warn!("Collection '{}' is empty; forcing rebuild", name);
                }
                Ok(None) => {
                    tracing::info!("No persisted collection '{}'; building from scratch", name);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to load persisted collection '{}': {}; forcing rebuild",
                        name,
                        e
                    );
                }
            }
        }

        self.rebuild().await
    }

    async fn rebuild(&self) -> Result<Arc<Collection>> {
        let name = self.config.collection_name.as_str();
        self.set_state(IndexState::Rebuilding);
        tracing::info!("Rebuilding collection '{}'", name);

        self.clear_collection(name)?;

        let documents = load_documents(&self.config.content_root).map_err(|e| {
            self.set_state(IndexState::Failed);
            e
        })?;
        let chunks = chunk_documents(
            &documents,
            self.config.chunk_size,
            self.config.chunk_overlap,
        )
        .map_err(|e| {
            self.set_state(IndexState::Failed);
            e
        })?;

        let dimensions = self.embedder.dimensions();

        if chunks.is_empty() {
            tracing::warn!("No chunks to index; persisting an empty collection");
            let collection = self.store.create(name, dimensions, &[]).map_err(|e| {
                self.set_state(IndexState::Failed);
                e
            })?;
            let handle = Arc::new(collection);
            self.publish(handle.clone());
            self.set_state(IndexState::Empty);
            return Ok(handle);
        }

        let embeddings = self.embed_chunks(&chunks).await.map_err(|e| {
            self.set_state(IndexState::Failed);
            e
        })?;

        let entries: Vec<(Chunk, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();

        let collection = self.store.create(name, dimensions, &entries).map_err(|e| {
            self.set_state(IndexState::Failed);
            e
        })?;

        tracing::info!(
            "Collection '{}' rebuilt with {} chunks ({} dimensions)",
            name,
            collection.chunk_count,
            collection.dimensions
        );
        let handle = Arc::new(collection);
        self.publish(handle.clone());
        self.set_state(IndexState::Loaded);
        Ok(handle)
    }

    /// Clear the collection ahead of a rebuild.
    ///
    /// Escalation order: targeted store-level delete first; if that fails,
    /// fall back to purging the whole store, which drops unrelated collections
    /// sharing it. A purge failure is fatal and is never retried.
    fn clear_collection(&self, name: &str) -> Result<()> {
        match self.store.clear(name) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(
                    "Failed to clear collection '{}': {}; falling back to full store purge",
                    name,
                    e
                );
                self.store.purge_all().map_err(|purge_err| {
                    self.set_state(IndexState::Failed);
                    DocQuarryError::IndexClearFailed(format!(
                        "could not clear collection '{}' ({}) and store purge also failed ({}); \
                         the index cannot be rebuilt cleanly, operator intervention required",
                        name, e, purge_err
                    ))
                })
            }
        }
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let batch_embeddings = self.embedder.embed_batch(&texts).await?;
            if batch_embeddings.len() != batch.len() {
                return Err(DocQuarryError::IndexCorrupted(format!(
                    "embedding provider returned {} vectors for {} chunks",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            embeddings.extend(batch_embeddings);
        }

        Ok(embeddings)
    }
}
