//! Runtime configuration for indexing and retrieval.

use std::path::PathBuf;

use crate::errors::RagError;

pub const DEFAULT_INDEX_DIR: &str = "vector_index";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_EMBEDDING_CONCURRENCY: usize = 4;

/// Configuration for RAG ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Directory holding `manifest.json` + `records.jsonl`.
    pub index_dir: PathBuf,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks of one document.
    pub chunk_overlap: usize,
    /// Number of chunks returned per query.
    pub top_k: usize,
    /// Maximum in-flight embedding requests while indexing.
    pub embedding_concurrency: usize,
    /// Enforced vector size, when known up front.
    pub expected_dim: Option<usize>,
    /// Embedding model id, recorded in the manifest.
    pub embedding_model: String,
}

impl RagConfig {
    /// Creates a config with default chunking and retrieval parameters.
    pub fn new_default(index_dir: impl Into<PathBuf>, embedding_model: impl Into<String>) -> Self {
        Self {
            index_dir: index_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
            expected_dim: None,
            embedding_model: embedding_model.into(),
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.index_dir.as_os_str().is_empty() {
            return Err(RagError::Config("index_dir is empty".into()));
        }
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        if self.expected_dim == Some(0) {
            return Err(RagError::Config("expected_dim must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::new_default("vector_index", "nomic-embed-text");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.chunk_overlap, 200);
        assert_eq!(cfg.top_k, 4);
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let mut cfg = RagConfig::new_default("idx", "m");
        cfg.chunk_overlap = cfg.chunk_size;
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));

        cfg.chunk_size = 0;
        cfg.chunk_overlap = 0;
        assert!(cfg.validate().is_err());
    }
}
