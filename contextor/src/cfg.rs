//! Runtime configuration loaded from environment variables.

use std::{fmt, path::PathBuf, str::FromStr};

use ai_llm_service::error_handler::EnvLookup;
use rag_store::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_INDEX_DIR,
    DEFAULT_TOP_K, RagConfig,
};

use crate::error::ContextorError;
use crate::prompt::Persona;

pub const DEFAULT_BIO_DIR: &str = "static/bio";

/// Where the context block of the prompt comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextMode {
    /// The whole bio corpus on every request.
    #[default]
    Bio,
    /// Top-k chunks from the persisted vector index.
    Retrieval,
}

impl ContextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextMode::Bio => "bio",
            ContextMode::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = ContextorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bio" | "full" => Ok(ContextMode::Bio),
            "retrieval" | "rag" => Ok(ContextMode::Retrieval),
            other => Err(ContextorError::Config(format!(
                "CONTEXT_MODE must be `bio` or `retrieval`, got `{other}`"
            ))),
        }
    }
}

/// Config bag for the chat pipeline and the indexer.
#[derive(Clone, Debug)]
pub struct ContextorConfig {
    pub mode: ContextMode,
    pub bio_dir: PathBuf,
    /// Indexer input (directory of `.txt` files or a single file).
    pub docs_path: PathBuf,
    pub index_dir: PathBuf,

    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding_concurrency: usize,
    pub embedding_dim: Option<usize>,

    pub persona: Persona,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            mode: ContextMode::Bio,
            bio_dir: DEFAULT_BIO_DIR.into(),
            docs_path: DEFAULT_BIO_DIR.into(),
            index_dir: DEFAULT_INDEX_DIR.into(),
            top_k: DEFAULT_TOP_K,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
            embedding_dim: None,
            persona: Persona::default(),
        }
    }
}

impl ContextorConfig {
    /// Builds the config from a variable lookup, with defaults for anything unset.
    ///
    /// # Errors
    /// [`ContextorError::Config`] for unparsable values.
    pub fn from_lookup(env: EnvLookup<'_>) -> Result<Self, ContextorError> {
        let dflt = Self::default();
        let get = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let bio_dir: PathBuf = get("BIO_DIR").map(PathBuf::from).unwrap_or(dflt.bio_dir);
        let docs_path = get("DOCS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| bio_dir.clone());

        let persona = Persona {
            owner: get("PERSONA_NAME").unwrap_or(dflt.persona.owner),
            contact: get("PERSONA_CONTACT"),
        };

        Ok(Self {
            mode: get("CONTEXT_MODE")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(dflt.mode),
            bio_dir,
            docs_path,
            index_dir: get("INDEX_DIR").map(PathBuf::from).unwrap_or(dflt.index_dir),
            top_k: parse(env, "RAG_TOP_K")?.unwrap_or(dflt.top_k),
            chunk_size: parse(env, "CHUNK_SIZE")?.unwrap_or(dflt.chunk_size),
            chunk_overlap: parse(env, "CHUNK_OVERLAP")?.unwrap_or(dflt.chunk_overlap),
            embedding_concurrency: parse(env, "EMBEDDING_CONCURRENCY")?
                .unwrap_or(dflt.embedding_concurrency),
            embedding_dim: parse(env, "EMBEDDING_DIM")?,
            persona,
        })
    }

    /// [`ContextorConfig::from_lookup`] over the process environment.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(&|k| std::env::var(k).ok())
    }

    /// Convert to a `rag_store::RagConfig` for indexing/retrieval.
    ///
    /// # Errors
    /// [`ContextorError::Rag`] if the chunking/retrieval knobs are inconsistent.
    pub fn make_rag_config(&self, embedding_model: &str) -> Result<RagConfig, ContextorError> {
        let cfg = RagConfig {
            index_dir: self.index_dir.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            embedding_concurrency: self.embedding_concurrency,
            expected_dim: self.embedding_dim,
            embedding_model: embedding_model.to_string(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse(env: EnvLookup<'_>, key: &str) -> Result<Option<usize>, ContextorError> {
    match env(key).filter(|v| !v.trim().is_empty()) {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ContextorError::Config(format!("{key} must be a non-negative integer, got `{v}`"))),
        None => Ok(None),
    }
}
