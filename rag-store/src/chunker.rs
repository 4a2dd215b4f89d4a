//! Character-based sliding-window chunking.
//!
//! Chunks are at most `size` characters; consecutive chunks of one document
//! share exactly `overlap` characters. The last chunk may be shorter. Offsets
//! are counted in `char`s so multi-byte text never splits inside a code point.

use services::uuid::stable_uuid;

use crate::errors::RagError;
use crate::record::{RagRecord, SourceDocument};

/// A chunk boundary within one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSpan<'a> {
    pub start_char: usize,
    pub end_char: usize,
    pub text: &'a str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlidingWindowChunker {
    size: usize,
    overlap: usize,
}

impl SlidingWindowChunker {
    /// # Errors
    /// [`RagError::Config`] unless `size > 0` and `overlap < size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, RagError> {
        if size == 0 || overlap >= size {
            return Err(RagError::Config(format!(
                "invalid chunking: size={size} overlap={overlap}"
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn split<'a>(&self, text: &'a str) -> Vec<ChunkSpan<'a>> {
        // Byte offset of every char boundary, plus the end of the string.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let n = bounds.len() - 1;

        let mut out = Vec::new();
        if n == 0 {
            return out;
        }

        let mut start = 0;
        loop {
            let end = (start + self.size).min(n);
            out.push(ChunkSpan {
                start_char: start,
                end_char: end,
                text: &text[bounds[start]..bounds[end]],
            });
            if end == n {
                break;
            }
            start = end - self.overlap;
        }
        out
    }

    /// Splits a document into records with stable ids and no embeddings.
    pub fn chunk_document(&self, doc: &SourceDocument) -> Vec<RagRecord> {
        self.split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, span)| RagRecord {
                id: stable_uuid(&format!("{}#{chunk_index}", doc.source)).to_string(),
                text: span.text.to_string(),
                source: doc.source.clone(),
                chunk_index,
                start_char: span.start_char,
                end_char: span.end_char,
                embedding: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_for_default_parameters() {
        let text = "a".repeat(2500);
        let chunker = SlidingWindowChunker::new(1000, 200).unwrap();
        let spans: Vec<(usize, usize)> = chunker
            .split(&text)
            .iter()
            .map(|s| (s.start_char, s.end_char))
            .collect();
        assert_eq!(spans, vec![(0, 1000), (800, 1800), (1600, 2500)]);
    }

    #[test]
    fn short_and_empty_text() {
        let chunker = SlidingWindowChunker::new(1000, 200).unwrap();
        assert!(chunker.split("").is_empty());

        let spans = chunker.split("hello");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello");
    }

    #[test]
    fn adjacent_chunks_share_exactly_overlap_chars() {
        let text: String = ('a'..='z').cycle().take(57).collect();
        let chunker = SlidingWindowChunker::new(10, 3).unwrap();
        let spans = chunker.split(&text);
        for pair in spans.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert!(prev.len() <= 10);
            assert_eq!(&prev[prev.len() - 3..], &next[..3]);
        }
        assert_eq!(spans.last().map(|s| s.end_char), Some(57));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "héllo wörld ✓ ünïcode";
        let chars: Vec<char> = text.chars().collect();
        let chunker = SlidingWindowChunker::new(4, 1).unwrap();
        for span in chunker.split(text) {
            let expected: String = chars[span.start_char..span.end_char].iter().collect();
            assert_eq!(span.text, expected);
        }
    }

    #[test]
    fn record_ids_are_stable_per_source_and_position() {
        let doc = SourceDocument {
            source: "bio.txt".into(),
            text: "x".repeat(30),
        };
        let chunker = SlidingWindowChunker::new(10, 2).unwrap();
        let a = chunker.chunk_document(&doc);
        let b = chunker.chunk_document(&doc);
        assert_eq!(a, b);
        assert_ne!(a[0].id, a[1].id);
        assert_eq!(a[1].chunk_index, 1);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(SlidingWindowChunker::new(10, 10).is_err());
        assert!(SlidingWindowChunker::new(0, 0).is_err());
    }
}
