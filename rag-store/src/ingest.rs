//! End-to-end indexing: load documents → chunk → embed → persist.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::chunker::SlidingWindowChunker;
use crate::config::RagConfig;
use crate::discovery::load_documents;
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::local_index::LocalIndex;
use crate::manifest::IndexManifest;
use crate::progress::{IndexPhase, Progress};
use crate::record::RagRecord;

/// Summary of a finished indexing run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub dim: usize,
    pub index_dir: PathBuf,
    pub content_digest: String,
}

/// Builds the vector index for every text document under `source` and
/// persists it to `cfg.index_dir`, overwriting any previous index.
///
/// Re-running with the same inputs and provider produces the same chunks,
/// ids and content digest.
///
/// # Errors
/// - [`RagError::Config`] for invalid chunking parameters
/// - [`RagError::EmptyCorpus`] if no document could be read
/// - embedding or I/O errors
pub async fn build_index(
    cfg: &RagConfig,
    source: impl AsRef<Path>,
    provider: &dyn EmbeddingsProvider,
    progress: &dyn Progress,
) -> Result<IndexReport, RagError> {
    cfg.validate()?;
    LocalIndex::check_target(&cfg.index_dir)?;
    let source = source.as_ref();
    info!("Indexing documents from {:?}", source);

    progress.phase(IndexPhase::Reading);
    let documents = load_documents(source)?;

    let chunker = SlidingWindowChunker::new(cfg.chunk_size, cfg.chunk_overlap)?;
    let mut records: Vec<RagRecord> = documents
        .iter()
        .flat_map(|d| chunker.chunk_document(d))
        .collect();
    info!(
        documents = documents.len(),
        chunks = records.len(),
        chunk_size = cfg.chunk_size,
        chunk_overlap = cfg.chunk_overlap,
        "documents chunked"
    );

    let dim = embed_missing(
        &mut records,
        provider,
        cfg.expected_dim,
        cfg.embedding_concurrency,
        progress,
    )
    .await?;

    let manifest = IndexManifest::new(cfg, &records, documents.len(), dim);
    let content_digest = manifest.content_digest.clone();
    let index = LocalIndex::from_parts(manifest, records)?;

    progress.phase(IndexPhase::Writing);
    index.persist(&cfg.index_dir)?;
    progress.finished(index.records().len());

    Ok(IndexReport {
        documents: documents.len(),
        chunks: index.records().len(),
        dim,
        index_dir: cfg.index_dir.clone(),
        content_digest,
    })
}
