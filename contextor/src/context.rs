//! Context sources: the text placed under "Context" in the system prompt.

use std::{future::Future, pin::Pin, sync::Arc};

use rag_store::{ChunkIndex, EmbeddingsProvider, RagQuery, join_hits, rag_context};
use tracing::debug;

use crate::bio::BioCorpus;
use crate::error::ContextorError;

pub type ContextFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;

/// Produces the context block for a user query.
pub trait ContextSource: Send + Sync {
    fn context_for<'a>(&'a self, query: &'a str) -> ContextFuture<'a>;
}

/// Whole bio corpus, identical for every query.
pub struct BioContext {
    merged: String,
}

impl BioContext {
    pub fn new(corpus: &BioCorpus) -> Self {
        Self {
            merged: corpus.merged(),
        }
    }
}

impl ContextSource for BioContext {
    fn context_for<'a>(&'a self, _query: &'a str) -> ContextFuture<'a> {
        Box::pin(async move { Ok(self.merged.clone()) })
    }
}

/// Top-k chunks from a vector index, embedded with the indexing provider.
pub struct RetrievalContext {
    index: Arc<dyn ChunkIndex>,
    embedder: Arc<dyn EmbeddingsProvider>,
    top_k: usize,
}

impl RetrievalContext {
    pub fn new(index: Arc<dyn ChunkIndex>, embedder: Arc<dyn EmbeddingsProvider>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }
}

impl ContextSource for RetrievalContext {
    fn context_for<'a>(&'a self, query: &'a str) -> ContextFuture<'a> {
        Box::pin(async move {
            let hits = rag_context(
                self.index.as_ref(),
                self.embedder.as_ref(),
                RagQuery {
                    text: query,
                    top_k: self.top_k,
                },
            )
            .await?;
            debug!(
                hits = hits.len(),
                sources = ?hits.iter().map(|h| h.source.as_str()).collect::<Vec<_>>(),
                "retrieved context"
            );
            Ok(join_hits(&hits))
        })
    }
}
