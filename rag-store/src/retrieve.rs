//! Retrieval helpers: embed the query, search the index, join the context.

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::local_index::ChunkIndex;
use crate::record::{RagHit, RagQuery};

use tracing::trace;

/// Embeds the query text with `provider` and returns the top-k hits.
///
/// # Errors
/// Returns embedding/provider errors.
pub async fn rag_context(
    index: &dyn ChunkIndex,
    provider: &dyn EmbeddingsProvider,
    query: RagQuery<'_>,
) -> Result<Vec<RagHit>, RagError> {
    trace!("retrieve::rag_context top_k={}", query.top_k);

    let qv = provider.embed(query.text).await?;
    if qv.len() != index.dim() {
        return Err(RagError::VectorSizeMismatch {
            got: qv.len(),
            want: index.dim(),
        });
    }
    let hits = index.search(&qv, query.top_k);

    trace!("retrieve::rag_context hits={}", hits.len());
    Ok(hits)
}

/// Concatenates hit texts with a blank line between them, in hit order.
pub fn join_hits(hits: &[RagHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str) -> RagHit {
        RagHit {
            score: 1.0,
            id: text.into(),
            text: text.into(),
            source: "s".into(),
            chunk_index: 0,
        }
    }

    #[test]
    fn join_preserves_order_with_blank_lines() {
        assert_eq!(join_hits(&[hit("one"), hit("two")]), "one\n\ntwo");
        assert_eq!(join_hits(&[]), "");
    }
}
