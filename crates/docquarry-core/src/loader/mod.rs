//! Document loading and chunking pipeline
//!
//! Walks a content root, extracts text from supported formats, and splits the
//! result into overlapping fixed-size chunks. Per-file failures are logged and
//! skipped; only a missing content root aborts the pass.

mod chunker;
mod docx;
mod pdf;
mod txt;

pub use chunker::split_text;

use crate::error::{DocQuarryError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories to exclude from scanning
const EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".cache",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "target",
];

/// A raw document loaded from the content root. Transient: exists only during
/// a build/rebuild pass and is discarded after chunking.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub raw_text: String,
    pub loaded_at: DateTime<Utc>,
}

/// Chunk metadata carried into the index payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Full source path, for provenance
    pub source_name: String,
    /// Human-readable filename, for citation display
    pub file_name: String,
    /// Best-effort document title
    pub title: Option<String>,
    /// Position of the chunk within its source document
    pub chunk_index: usize,
}

/// A bounded-length slice of a source document used as the retrieval unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Supported document formats, selected by extension at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Select a format from a file extension; `None` means unsupported
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Extract plain text from a file of this format
    pub fn extract(&self, path: &Path) -> Result<String> {
        match self {
            Self::Pdf => pdf::extract(path),
            Self::Docx => docx::extract(path),
            Self::Txt => txt::extract(path),
        }
    }
}

/// Load all supported documents under `content_root`.
///
/// Traversal order is sorted by file name so repeated passes over an unchanged
/// root produce the same document sequence. Fails with `ContentPathNotFound`
/// if the root does not exist; per-file extraction failures and unsupported
/// extensions are logged and skipped.
pub fn load_documents(content_root: &Path) -> Result<Vec<SourceDocument>> {
    if !content_root.exists() {
        return Err(DocQuarryError::ContentPathNotFound(
            content_root.to_path_buf(),
        ));
    }

    tracing::info!("Loading documents from {}", content_root.display());

    let mut documents = Vec::new();

    let walker = WalkDir::new(content_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(format) = DocumentFormat::from_path(path) else {
            tracing::warn!("Skipping unsupported file format: {}", path.display());
            continue;
        };

        match format.extract(path) {
            Ok(raw_text) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                tracing::info!("Loaded {} ({} chars)", file_name, raw_text.chars().count());
                documents.push(SourceDocument {
                    path: path.to_path_buf(),
                    file_name,
                    raw_text,
                    loaded_at: Utc::now(),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("Total documents loaded: {}", documents.len());
    Ok(documents)
}

/// Split loaded documents into overlapping fixed-size chunks.
///
/// Pure function of its inputs: the same documents with the same parameters
/// always yield the same chunk sequence, ordered by source traversal order
/// then chunk position. Chunk identity is positional, not content-hashed.
pub fn chunk_documents(
    documents: &[SourceDocument],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>> {
    if chunk_size == 0 || chunk_overlap >= chunk_size {
        return Err(DocQuarryError::Config(format!(
            "invalid chunking parameters: size {} overlap {}",
            chunk_size, chunk_overlap
        )));
    }

    let mut chunks = Vec::new();
    for doc in documents {
        let title = extract_title(&doc.raw_text, &doc.file_name);
        for (chunk_index, content) in split_text(&doc.raw_text, chunk_size, chunk_overlap)
            .into_iter()
            .enumerate()
        {
            chunks.push(Chunk {
                content,
                metadata: ChunkMetadata {
                    source_name: doc.path.to_string_lossy().to_string(),
                    file_name: doc.file_name.clone(),
                    title: title.clone(),
                    chunk_index,
                },
            });
        }
    }

    tracing::info!("Total chunks created: {}", chunks.len());
    Ok(chunks)
}

/// Extract a title from document text: first short non-empty line, falling
/// back to the prettified file stem.
pub(crate) fn extract_title(content: &str, filename: &str) -> Option<String> {
    let first_line = content
        .lines()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if !first_line.is_empty() && first_line.len() < 200 {
        return Some(first_line.to_string());
    }

    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace('_', " ").replace('-', " "))
}

fn should_skip(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();

    if name.starts_with('.') && name.len() > 1 {
        return true;
    }

    entry.file_type().is_dir() && EXCLUDE_DIRS.iter().any(|d| name == *d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_selection() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b/policy.PDF")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.docx")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("legacy.doc")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("readme.txt")),
            Some(DocumentFormat::Txt)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_missing_root_fails() {
        let err = load_documents(Path::new("/nonexistent/corpus/root")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DocQuarryError::ContentPathNotFound(_)
        ));
    }

    #[test]
    fn test_load_skips_unsupported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("keep.txt"), "policy text").unwrap();
        fs::write(temp.path().join("skip.png"), [0u8, 1, 2]).unwrap();

        let docs = load_documents(temp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "keep.txt");
        assert_eq!(docs[0].raw_text, "policy text");
    }

    #[test]
    fn test_load_order_is_deterministic() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "second").unwrap();
        fs::write(temp.path().join("a.txt"), "first").unwrap();

        let first = load_documents(temp.path()).unwrap();
        let second = load_documents(temp.path()).unwrap();
        let names: Vec<_> = first.iter().map(|d| d.file_name.clone()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(
            names,
            second.iter().map(|d| d.file_name.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_chunk_metadata_positions() {
        let doc = SourceDocument {
            path: PathBuf::from("/corpus/policy.txt"),
            file_name: "policy.txt".to_string(),
            raw_text: "A".repeat(1500),
            loaded_at: Utc::now(),
        };
        let chunks = chunk_documents(&[doc], 1000, 200).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[1].metadata.chunk_index, 1);
        assert_eq!(chunks[1].metadata.file_name, "policy.txt");
    }

    #[test]
    fn test_chunk_rejects_bad_overlap() {
        assert!(chunk_documents(&[], 100, 100).is_err());
        assert!(chunk_documents(&[], 0, 0).is_err());
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("  \n\nLeave Policy\n\nBody...", "x.txt"),
            Some("Leave Policy".to_string())
        );
        let long_line = "a".repeat(250);
        assert_eq!(
            extract_title(&long_line, "employee_handbook.txt"),
            Some("employee handbook".to_string())
        );
    }
}
