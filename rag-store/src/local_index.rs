//! Local persisted vector index: `manifest.json` + `records.jsonl`.
//!
//! Search is brute-force cosine similarity, which is plenty for a few
//! hundred chunks of biography text.

use std::{fs, path::Path};

use tracing::{debug, info, trace, warn};

use crate::errors::RagError;
use crate::io_jsonl::{read_all_records, write_all_records};
use crate::manifest::{IndexManifest, MANIFEST_FILE, RECORDS_FILE};
use crate::record::{RagHit, RagRecord};

/// Nearest-neighbour lookup over stored chunks.
pub trait ChunkIndex: Send + Sync {
    /// Returns up to `top_k` hits, most similar first.
    fn search(&self, query: &[f32], top_k: usize) -> Vec<RagHit>;

    /// Vector size of the stored embeddings.
    fn dim(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct LocalIndex {
    manifest: IndexManifest,
    records: Vec<RagRecord>,
}

impl LocalIndex {
    /// Wraps fully embedded records; every vector must have `manifest.dim` entries.
    pub fn from_parts(manifest: IndexManifest, records: Vec<RagRecord>) -> Result<Self, RagError> {
        if records.len() != manifest.records {
            return Err(RagError::Parse(format!(
                "manifest lists {} records but {} were found",
                manifest.records,
                records.len()
            )));
        }
        for r in &records {
            match &r.embedding {
                Some(v) if v.len() == manifest.dim => {}
                Some(v) => {
                    return Err(RagError::VectorSizeMismatch {
                        got: v.len(),
                        want: manifest.dim,
                    });
                }
                None => {
                    return Err(RagError::Parse(format!("record {} has no embedding", r.id)));
                }
            }
        }
        Ok(Self { manifest, records })
    }

    /// Loads an index persisted by [`LocalIndex::persist`].
    ///
    /// # Errors
    /// [`RagError::MissingIndex`] if the directory or either file is absent;
    /// parse/size errors if the contents disagree with the manifest.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, RagError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        let records_path = dir.join(RECORDS_FILE);
        if !manifest_path.is_file() || !records_path.is_file() {
            warn!("no vector index under {:?}", dir);
            return Err(RagError::MissingIndex {
                path: dir.to_path_buf(),
            });
        }

        let manifest = IndexManifest::read(&manifest_path)?;
        let records = read_all_records(&records_path)?;
        let index = Self::from_parts(manifest, records)?;

        info!(
            dir = %dir.display(),
            records = index.records.len(),
            dim = index.manifest.dim,
            model = %index.manifest.embedding_model,
            "vector index loaded"
        );
        Ok(index)
    }

    /// Writes the index to `dir`, replacing a prior index there.
    ///
    /// Only `manifest.json` and `records.jsonl` are touched: each is written
    /// to a temp file inside `dir` and renamed over its target, records
    /// first and manifest last.
    ///
    /// # Errors
    /// [`RagError::Config`] if `dir` is not a directory, or is non-empty
    /// without holding a prior index (see [`LocalIndex::check_target`]).
    pub fn persist(&self, dir: impl AsRef<Path>) -> Result<(), RagError> {
        let dir = dir.as_ref();
        Self::check_target(dir)?;
        fs::create_dir_all(dir)?;

        let records_tmp = dir.join(tmp_name(RECORDS_FILE));
        let manifest_tmp = dir.join(tmp_name(MANIFEST_FILE));
        debug!("persisting index to {:?}", dir);

        write_all_records(&records_tmp, &self.records)?;
        self.manifest.write(&manifest_tmp)?;
        fs::rename(&records_tmp, dir.join(RECORDS_FILE))?;
        fs::rename(&manifest_tmp, dir.join(MANIFEST_FILE))?;

        info!(dir = %dir.display(), records = self.records.len(), "vector index written");
        Ok(())
    }

    /// Checks that `dir` may receive an index: absent, empty, or holding a
    /// prior index (a `manifest.json`).
    pub fn check_target(dir: impl AsRef<Path>) -> Result<(), RagError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }
        if !dir.is_dir() {
            return Err(RagError::Config(format!(
                "index location {} is not a directory",
                dir.display()
            )));
        }
        if dir.join(MANIFEST_FILE).is_file() {
            return Ok(());
        }

        let ours = [
            RECORDS_FILE.to_string(),
            tmp_name(RECORDS_FILE),
            tmp_name(MANIFEST_FILE),
        ];
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if !ours.contains(&name) {
                return Err(RagError::Config(format!(
                    "refusing to write an index into {}: it is not empty and holds no {MANIFEST_FILE}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn records(&self) -> &[RagRecord] {
        &self.records
    }
}

impl ChunkIndex for LocalIndex {
    fn search(&self, query: &[f32], top_k: usize) -> Vec<RagHit> {
        trace!("LocalIndex::search top_k={top_k} records={}", self.records.len());
        if query.len() != self.manifest.dim {
            warn!(
                got = query.len(),
                want = self.manifest.dim,
                "query vector size differs from index"
            );
            return Vec::new();
        }

        let mut scored: Vec<(f32, &RagRecord)> = self
            .records
            .iter()
            .filter_map(|r| r.embedding.as_deref().map(|v| (cosine_similarity(query, v), r)))
            .collect();

        // Stable sort keeps index order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, r)| RagHit::from_record(r, score))
            .collect()
    }

    fn dim(&self) -> usize {
        self.manifest.dim
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

fn tmp_name(file: &str) -> String {
    format!(".{file}.tmp")
}

/// Cosine similarity; zero-norm vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagConfig;

    fn rec(i: usize, v: Vec<f32>) -> RagRecord {
        RagRecord {
            id: format!("id-{i}"),
            text: format!("chunk {i}"),
            source: "bio.txt".into(),
            chunk_index: i,
            start_char: 0,
            end_char: 7,
            embedding: Some(v),
        }
    }

    fn index(records: Vec<RagRecord>) -> LocalIndex {
        let cfg = RagConfig::new_default("idx", "m");
        let manifest = IndexManifest::new(&cfg, &records, 1, 2);
        LocalIndex::from_parts(manifest, records).unwrap()
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn search_orders_by_similarity_and_truncates() {
        let idx = index(vec![
            rec(0, vec![0.0, 1.0]),
            rec(1, vec![1.0, 0.0]),
            rec(2, vec![1.0, 1.0]),
        ]);
        let hits = idx.search(&[1.0, 0.1], 2);
        let order: Vec<usize> = hits.iter().map(|h| h.chunk_index).collect();
        assert_eq!(order, vec![1, 2]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let idx = index(vec![rec(0, vec![1.0, 0.0]), rec(1, vec![2.0, 0.0])]);
        let hits = idx.search(&[1.0, 0.0], 4);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_index, 0);
    }

    #[test]
    fn wrong_query_dimension_yields_no_hits() {
        let idx = index(vec![rec(0, vec![1.0, 0.0])]);
        assert!(idx.search(&[1.0, 0.0, 0.0], 4).is_empty());
    }

    #[test]
    fn from_parts_checks_dimensions() {
        let cfg = RagConfig::new_default("idx", "m");
        let records = vec![rec(0, vec![1.0, 0.0, 0.0])];
        let manifest = IndexManifest::new(&cfg, &records, 1, 2);
        assert!(matches!(
            LocalIndex::from_parts(manifest, records),
            Err(RagError::VectorSizeMismatch { got: 3, want: 2 })
        ));
    }
}
