//! Offline index build over the configured documents.

use std::{path::Path, sync::Arc};

use ai_llm_service::LlmServiceProfiles;
use rag_store::{IndexReport, LlmEmbedder, Progress, build_index};
use tracing::info;

use crate::cfg::ContextorConfig;
use crate::error::ContextorError;

/// Chunks, embeds and persists every document under `source`
/// (defaults to `cfg.docs_path`) into `cfg.index_dir`.
pub async fn index_documents(
    cfg: &ContextorConfig,
    svc: Arc<LlmServiceProfiles>,
    source: Option<&Path>,
    progress: &dyn Progress,
) -> Result<IndexReport, ContextorError> {
    let embedding_model = svc.profiles().1.model.clone();
    let rag_cfg = cfg.make_rag_config(&embedding_model)?;
    let source = source.unwrap_or(cfg.docs_path.as_path());
    let embedder = LlmEmbedder::new(svc, cfg.embedding_dim);

    let report = build_index(&rag_cfg, source, &embedder, progress).await?;
    info!(
        documents = report.documents,
        chunks = report.chunks,
        dim = report.dim,
        index_dir = %report.index_dir.display(),
        "index built"
    );
    Ok(report)
}
