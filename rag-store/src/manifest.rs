//! Index manifest: what was indexed, with which model, and a content digest.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::record::RagRecord;

pub const FORMAT_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";
pub const RECORDS_FILE: &str = "records.jsonl";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub embedding_model: String,
    pub dim: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Number of chunk records.
    pub records: usize,
    /// Number of source documents.
    pub documents: usize,
    /// blake3 over ids and texts of all records, in order.
    pub content_digest: String,
    pub created_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(cfg: &RagConfig, records: &[RagRecord], documents: usize, dim: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            embedding_model: cfg.embedding_model.clone(),
            dim,
            chunk_size: cfg.chunk_size,
            chunk_overlap: cfg.chunk_overlap,
            records: records.len(),
            documents,
            content_digest: content_digest(records),
            created_at: Utc::now(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, RagError> {
        let data = std::fs::read_to_string(path)?;
        let m: Self = serde_json::from_str(&data)?;
        if m.format_version != FORMAT_VERSION {
            return Err(RagError::Parse(format!(
                "unsupported index format_version {} (expected {FORMAT_VERSION})",
                m.format_version
            )));
        }
        Ok(m)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), RagError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Digest of chunk identity and text; independent of embeddings and time.
pub fn content_digest(records: &[RagRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in records {
        hasher.update(r.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(r.text.as_bytes());
        hasher.update(&[0xff]);
    }
    hasher.finalize().to_hex().to_string()
}
