//! The chat pipeline: context source → prompt template → answer generator.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use rag_store::{ChunkIndex, LlmEmbedder, LocalIndex};
use tracing::{error, info, warn};

use crate::bio::BioCorpus;
use crate::cfg::{ContextMode, ContextorConfig};
use crate::context::{BioContext, ContextSource, RetrievalContext};
use crate::error::ContextorError;
use crate::history::ChatHistory;
use crate::llm::AnswerGenerator;
use crate::prompt::{PromptContext, PromptTemplate};

/// Built once at startup and shared read-only across requests.
pub struct ChatPipeline {
    context: Arc<dyn ContextSource>,
    template: PromptTemplate,
    generator: AnswerGenerator,
    mode: ContextMode,
}

impl ChatPipeline {
    pub fn new(
        context: Arc<dyn ContextSource>,
        template: PromptTemplate,
        generator: AnswerGenerator,
        mode: ContextMode,
    ) -> Self {
        Self {
            context,
            template,
            generator,
            mode,
        }
    }

    /// Wires the pipeline for the configured context mode.
    ///
    /// # Errors
    /// [`ContextorError::Rag`] with `MissingIndex` when retrieval mode is
    /// selected but no index has been built.
    pub fn from_config(
        cfg: &ContextorConfig,
        svc: Arc<LlmServiceProfiles>,
    ) -> Result<Self, ContextorError> {
        let context: Arc<dyn ContextSource> = match cfg.mode {
            ContextMode::Bio => Arc::new(BioContext::new(&BioCorpus::load(&cfg.bio_dir))),
            ContextMode::Retrieval => {
                let index = LocalIndex::load(&cfg.index_dir)?;
                let embedding_model = &svc.profiles().1.model;
                if &index.manifest().embedding_model != embedding_model {
                    warn!(
                        index_model = %index.manifest().embedding_model,
                        configured_model = %embedding_model,
                        "index was built with a different embedding model"
                    );
                }
                let embedder = LlmEmbedder::new(svc.clone(), Some(index.dim()));
                Arc::new(RetrievalContext::new(
                    Arc::new(index),
                    Arc::new(embedder),
                    cfg.top_k,
                ))
            }
        };

        info!(mode = %cfg.mode, owner = %cfg.persona.owner, "chat pipeline ready");
        Ok(Self::new(
            context,
            PromptTemplate::new(cfg.persona.clone()),
            AnswerGenerator::new(svc),
            cfg.mode,
        ))
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Answers `query` given the session's prior turns; `None` on any failure.
    pub async fn answer(&self, query: &str, history: &ChatHistory) -> Option<String> {
        let context = match self.context.context_for(query).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "failed to build context");
                return None;
            }
        };

        let messages = self.template.render(&PromptContext {
            context,
            history: history.render(),
            user_query: query.to_string(),
        });
        self.generator.generate(&messages).await
    }
}
