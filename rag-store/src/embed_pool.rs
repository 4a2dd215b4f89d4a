//! Embedding executor with bounded concurrency and dimension checks.

use crate::{
    embed::EmbeddingsProvider, errors::RagError, progress::{IndexPhase, Progress}, record::RagRecord,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

/// Embeds texts for records that have no precomputed vectors.
///
/// Requests run with at most `concurrency` in flight; results are applied in
/// record order. Every vector must have the same length (`expected_dim` when
/// given, otherwise the length of the first vector).
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or the provider's error if an embedding call fails.
pub async fn embed_missing(
    records: &mut [RagRecord],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
    progress: &dyn Progress,
) -> Result<usize, RagError> {
    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.embedding.is_none().then_some(i))
        .collect();

    info!(
        total = records.len(),
        missing = idxs.len(),
        concurrency,
        "embedding chunks"
    );

    let mut dim = expected_dim.or_else(|| records.iter().find_map(|r| r.embedding.as_ref().map(Vec::len)));

    if idxs.is_empty() {
        debug!("all chunks already carry vectors");
    } else {
        progress.phase(IndexPhase::Embedding {
            chunks: idxs.len() as u64,
        });

        let results: Vec<(usize, Vec<f32>)> = stream::iter(idxs.into_iter())
            .map(|i| {
                let (text, source) = (records[i].text.clone(), records[i].source.clone());
                async move {
                    let v = provider.embed(&text).await?;
                    progress.chunk_embedded(&source);
                    Ok::<(usize, Vec<f32>), RagError>((i, v))
                }
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        for (i, v) in results {
            let want = *dim.get_or_insert(v.len());
            if v.len() != want {
                return Err(RagError::VectorSizeMismatch { got: v.len(), want });
            }
            records[i].embedding = Some(v);
        }
    }

    // Precomputed vectors must agree as well.
    let want = dim.unwrap_or(0);
    if let Some(v) = records
        .iter()
        .filter_map(|r| r.embedding.as_ref())
        .find(|v| v.len() != want)
    {
        return Err(RagError::VectorSizeMismatch { got: v.len(), want });
    }

    debug!(dim = want, "embeddings filled");
    Ok(want)
}
