//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// A plain-text document as read from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name (relative to the scanned directory).
    pub source: String,
    pub text: String,
}

/// One chunk of a source document, persisted one per line in `records.jsonl`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RagRecord {
    /// Stable UUIDv5 of `source#chunk_index`.
    pub id: String,
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    /// Character offsets into the source document, `[start_char, end_char)`.
    pub start_char: usize,
    pub end_char: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Query parameters for RAG retrieval.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: usize,
}

/// A single retrieval hit with score, text and source.
#[derive(Clone, Debug, PartialEq)]
pub struct RagHit {
    pub score: f32,
    pub id: String,
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
}

impl RagHit {
    pub(crate) fn from_record(record: &RagRecord, score: f32) -> Self {
        Self {
            score,
            id: record.id.clone(),
            text: record.text.clone(),
            source: record.source.clone(),
            chunk_index: record.chunk_index,
        }
    }
}
