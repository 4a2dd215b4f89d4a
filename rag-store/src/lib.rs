//! Local RAG store: document chunking, embedding and a persisted vector index.
//!
//! This crate provides a small API to:
//! - Split plain-text documents into overlapping chunks
//! - Embed the chunks and persist them under an index directory
//! - Load the index and retrieve top‑K context for a textual query
//!
//! The design is flat (no deep nesting) and splits responsibilities into focused modules.

mod chunker;
mod config;
mod discovery;
mod embed;
mod embed_pool;
mod errors;
mod ingest;
mod io_jsonl;
mod local_index;
mod manifest;
mod progress;
mod record;
mod retrieve;

pub use chunker::{ChunkSpan, SlidingWindowChunker};
pub use config::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_INDEX_DIR,
    DEFAULT_TOP_K, RagConfig,
};
pub use discovery::{load_documents, read_documents, text_files_in};
pub use embed::{EmbeddingsProvider, llm_embedder::LlmEmbedder};
pub use errors::RagError;
pub use ingest::{IndexReport, build_index};
pub use local_index::{ChunkIndex, LocalIndex, cosine_similarity};
pub use manifest::{IndexManifest, MANIFEST_FILE, RECORDS_FILE, content_digest};
pub use progress::{IndexPhase, IndicatifProgress, NoopProgress, Progress};
pub use record::{RagHit, RagQuery, RagRecord, SourceDocument};
pub use retrieve::{join_hits, rag_context};
