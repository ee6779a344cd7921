//! Fixed-window text splitting
//!
//! Windows are counted in characters, not bytes, and overlap by exactly
//! `overlap` characters (stride = size - overlap). The last chunk of a
//! document may be shorter than `size`. Splitting is deterministic, which the
//! index rebuild invariant depends on.

/// Split text into overlapping fixed-size character windows.
///
/// Caller guarantees `overlap < size`; violations are a configuration error
/// checked upstream.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(size > 0 && overlap < size);

    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, plus the end of the string, so
    // windows can be sliced without landing inside a multi-byte character.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let n_chars = bounds.len() - 1;

    if n_chars <= size {
        return vec![text.to_string()];
    }

    let stride = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + size).min(n_chars);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        if end == n_chars {
            break;
        }
        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_content_single_chunk() {
        let chunks = split_text("Small content.", 100, 20);
        assert_eq!(chunks, vec!["Small content.".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", 100, 20).is_empty());
    }

    #[test]
    fn test_1500_chars_size_1000_overlap_200() {
        let text = "A".repeat(1500);
        let chunks = split_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        // Second chunk starts at 800: 200 chars of overlap + 500 remainder.
        assert_eq!(chunks[1].chars().count(), 700);
    }

    #[test]
    fn test_determinism() {
        let text: String = (0..3000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let a = split_text(&text, 500, 120);
        let b = split_text(&text, 500, 120);
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_overlap_between_consecutive_chunks() {
        let text: String = (0..2500).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let overlap = 200;
        let chunks = split_text(&text, 1000, overlap);
        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .chars()
                .skip(pair[0].chars().count() - overlap)
                .collect();
            let head: String = pair[1].chars().take(overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_reassembly_covers_whole_text() {
        let text: String = (0..2347).map(|i| ((i % 10) as u8 + b'0') as char).collect();
        let size = 400;
        let overlap = 100;
        let chunks = split_text(&text, size, overlap);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(overlap.min(chunk.chars().count())));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_handles_unicode() {
        let text = "héllo wörld ".repeat(100);
        let chunks = split_text(&text, 50, 10);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
