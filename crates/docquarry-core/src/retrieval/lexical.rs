//! In-memory BM25 lexical index
//!
//! Built fresh per retrieval call from the collection's persisted chunk
//! snapshot, so the lexical and vector signals always rank over the same
//! corpus version. Never persisted.

use crate::loader::Chunk;
use std::collections::HashMap;

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

/// Term-frequency index over a chunk corpus with Okapi BM25 scoring
pub struct LexicalIndex {
    chunks: Vec<Chunk>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    doc_freq: HashMap<String, usize>,
    avg_doc_len: f32,
}

impl LexicalIndex {
    /// Build the index from a chunk corpus
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut term_freqs = Vec::with_capacity(chunks.len());
        let mut doc_lens = Vec::with_capacity(chunks.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for chunk in &chunks {
            let tokens = tokenize(&chunk.content);
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f32 / doc_lens.len() as f32
        };

        Self {
            chunks,
            term_freqs,
            doc_lens,
            doc_freq,
            avg_doc_len,
        }
    }

    /// Number of chunks in the index
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Rank chunks by BM25 score against the query, descending. Chunks with
    /// no term overlap are omitted; an empty result is not an error.
    pub fn score(&self, query: &str, top_k: usize) -> Vec<(Chunk, f32)> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() || self.chunks.is_empty() {
            return Vec::new();
        }

        let n = self.chunks.len() as f32;
        let mut scored: Vec<(usize, f32)> = Vec::new();

        for (doc_idx, freqs) in self.term_freqs.iter().enumerate() {
            let doc_len = self.doc_lens[doc_idx] as f32;
            let mut score = 0.0f32;

            for term in &query_terms {
                let tf = match freqs.get(term) {
                    Some(&tf) => tf as f32,
                    None => continue,
                };
                let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
                let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                let norm = 1.0 - BM25_B + BM25_B * doc_len / self.avg_doc_len.max(1.0);
                score += idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm);
            }

            if score > 0.0 {
                scored.push((doc_idx, score));
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(idx, score)| (self.chunks[idx].clone(), score))
            .collect()
    }
}

/// Lowercase alphanumeric tokenization
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ChunkMetadata;

    fn chunk(content: &str, file: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source_name: format!("/corpus/{}", file),
                file_name: file.to_string(),
                title: None,
                chunk_index: 0,
            },
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Leave-policy: 20 days!"),
            vec!["leave", "policy", "20", "days"]
        );
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_term_bearing_document_ranks_first() {
        let index = LexicalIndex::build(vec![
            chunk("expense reports are filed monthly", "expenses.txt"),
            chunk("annual leave policy grants twenty days of leave", "leave.txt"),
            chunk("the office closes at six", "office.txt"),
        ]);

        let results = index.score("leave policy", 3);
        assert!(!results.is_empty());
        assert_eq!(results[0].0.metadata.file_name, "leave.txt");
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_no_overlap_yields_empty() {
        let index = LexicalIndex::build(vec![chunk("alpha beta", "a.txt")]);
        assert!(index.score("gamma delta", 5).is_empty());
    }

    #[test]
    fn test_empty_query_yields_empty() {
        let index = LexicalIndex::build(vec![chunk("alpha beta", "a.txt")]);
        assert!(index.score("", 5).is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let index = LexicalIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.score("anything", 5).is_empty());
    }

    #[test]
    fn test_top_k_truncation() {
        let chunks: Vec<Chunk> = (0..10)
            .map(|i| chunk(&format!("shared term document {}", i), "docs.txt"))
            .collect();
        let index = LexicalIndex::build(chunks);
        let results = index.score("shared", 4);
        assert_eq!(results.len(), 4);
    }
}
