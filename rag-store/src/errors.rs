//! Unified error types for the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed persisted data (with location detail).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// No readable text documents under the given source.
    #[error("no text documents found under {path}")]
    EmptyCorpus { path: PathBuf },

    /// Mismatch in vector dimensionality across records.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Retrieval was requested but no index is persisted at `path`.
    #[error("vector index not found at {path}; run the `index` command first")]
    MissingIndex { path: PathBuf },

    /// Embedding backend failed.
    #[error("embedding error: {0}")]
    Embedding(String),
}

impl RagError {
    /// `true` when the error means "build the index first".
    pub fn is_missing_index(&self) -> bool {
        matches!(self, RagError::MissingIndex { .. })
    }
}
