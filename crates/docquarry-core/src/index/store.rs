//! Vector collection storage
//!
//! Stores chunk payloads and embeddings as BLOBs in SQLite and computes
//! cosine similarity in Rust. Collections are rebuild-and-replace: vectors
//! are never mutated in place.

use crate::error::{DocQuarryError, Result};
use crate::loader::{Chunk, ChunkMetadata};
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const CREATE_TABLES: &str = r#"
-- Collection metadata (one row per named collection)
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    dimensions INTEGER NOT NULL,
    chunk_count INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- Chunk payloads and their embeddings
CREATE TABLE IF NOT EXISTS vectors (
    collection TEXT NOT NULL,
    seq INTEGER NOT NULL,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    source_name TEXT NOT NULL,
    file_name TEXT NOT NULL,
    title TEXT,
    chunk_index INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (collection, seq)
);
"#;

/// A named, persisted set of embedded chunks. The only entity with a
/// disk-backed lifecycle; destroyed only by explicit cleanup or a rebuild.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub created_at: String,
}

impl Collection {
    /// Whether the collection holds no vectors (a valid terminal state)
    pub fn is_empty(&self) -> bool {
        self.chunk_count == 0
    }
}

/// A chunk with its similarity score, produced by vector search
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Persistent store for named vector collections
pub struct IndexStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl IndexStore {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory store (tests and ephemeral deployments)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Get the default store path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }

    /// On-disk location of the store, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement; the connection itself
        // stays usable, so recover the guard.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load collection metadata by name
    pub fn load(&self, name: &str) -> Result<Option<Collection>> {
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT name, dimensions, chunk_count, created_at FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok(Collection {
                    name: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                    chunk_count: row.get::<_, i64>(2)? as usize,
                    created_at: row.get(3)?,
                })
            },
        );

        match result {
            Ok(collection) => Ok(Some(collection)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create (or replace) a collection from embedded chunks.
    ///
    /// Runs in a single transaction: an interrupted create leaves the previous
    /// state intact rather than a half-written collection.
    pub fn create(
        &self,
        name: &str,
        dimensions: usize,
        entries: &[(Chunk, Vec<f32>)],
    ) -> Result<Collection> {
        for (_, embedding) in entries {
            if embedding.len() != dimensions {
                return Err(DocQuarryError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM vectors WHERE collection = ?1", params![name])?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;

        for (seq, (chunk, embedding)) in entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO vectors
                 (collection, seq, content, content_hash, source_name, file_name, title, chunk_index, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    name,
                    seq as i64,
                    chunk.content,
                    hash_content(&chunk.content),
                    chunk.metadata.source_name,
                    chunk.metadata.file_name,
                    chunk.metadata.title,
                    chunk.metadata.chunk_index as i64,
                    embedding_to_bytes(embedding),
                ],
            )?;
        }

        tx.execute(
            "INSERT INTO collections (name, dimensions, chunk_count, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, dimensions as i64, entries.len() as i64, now],
        )?;

        tx.commit()?;

        Ok(Collection {
            name: name.to_string(),
            dimensions,
            chunk_count: entries.len(),
            created_at: now,
        })
    }

    /// Delete a collection by name. Safe to call when the collection does not
    /// exist: idempotent deletion, a no-op rather than an error.
    pub fn clear(&self, name: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM vectors WHERE collection = ?1", params![name])?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(())
    }

    /// Drop every collection in the store. Coarse-grained fallback for when a
    /// targeted clear fails; drops unrelated collections sharing the store.
    pub fn purge_all(&self) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM vectors", [])?;
        tx.execute("DELETE FROM collections", [])?;
        tx.commit()?;
        Ok(())
    }

    /// Number of vectors in a collection (0 when the collection is missing)
    pub fn count(&self, name: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vectors WHERE collection = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Rank the collection's vectors by cosine similarity to `query`,
    /// descending, returning at most `k` results.
    pub fn similarity_search(
        &self,
        name: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collection = self
            .load(name)?
            .ok_or_else(|| DocQuarryError::CollectionNotFound(name.to_string()))?;

        if query.len() != collection.dimensions {
            return Err(DocQuarryError::DimensionMismatch {
                expected: collection.dimensions,
                actual: query.len(),
            });
        }

        let mut results: Vec<ScoredChunk> = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT content, source_name, file_name, title, chunk_index, embedding
                 FROM vectors WHERE collection = ?1 ORDER BY seq",
            )?;
            let rows = stmt
                .query_map(params![name], |row| {
                    let embedding_bytes: Vec<u8> = row.get(5)?;
                    Ok((
                        Chunk {
                            content: row.get(0)?,
                            metadata: ChunkMetadata {
                                source_name: row.get(1)?,
                                file_name: row.get(2)?,
                                title: row.get(3)?,
                                chunk_index: row.get::<_, i64>(4)? as usize,
                            },
                        },
                        bytes_to_embedding(&embedding_bytes),
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(chunk, embedding)| ScoredChunk {
                    score: cosine_similarity(query, &embedding),
                    chunk,
                })
                .collect()
        };

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    /// All chunk payloads of a collection in insertion order. Feeds the
    /// lexical index so both retrieval signals see the same snapshot.
    pub fn all_chunks(&self, name: &str) -> Result<Vec<Chunk>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT content, source_name, file_name, title, chunk_index
             FROM vectors WHERE collection = ?1 ORDER BY seq",
        )?;
        let chunks = stmt
            .query_map(params![name], |row| {
                Ok(Chunk {
                    content: row.get(0)?,
                    metadata: ChunkMetadata {
                        source_name: row.get(1)?,
                        file_name: row.get(2)?,
                        title: row.get(3)?,
                        chunk_index: row.get::<_, i64>(4)? as usize,
                    },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(chunks)
    }
}

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
