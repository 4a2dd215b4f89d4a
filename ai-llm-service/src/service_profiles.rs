//! Shared LLM service with two active profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Provider clients are built eagerly so configuration errors surface at startup.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatMessage, LlmModelConfig, LlmProvider, LlmServiceProfiles};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chat = LlmModelConfig {
//!         provider: LlmProvider::Ollama,
//!         model: "llama3.1".into(),
//!         endpoint: "http://localhost:11434".into(),
//!         api_key: None,
//!         max_tokens: Some(512),
//!         temperature: Some(0.7),
//!         top_p: None,
//!         timeout_secs: Some(30),
//!     };
//!     let embedding = LlmModelConfig { model: "nomic-embed-text".into(), ..chat.clone() };
//!
//!     let svc = Arc::new(LlmServiceProfiles::new(chat, embedding, Some(10))?);
//!
//!     let answer = svc.chat(&[ChatMessage::user("Hello")]).await?;
//!     let emb = svc.embed("Ferris").await?;
//!     println!("{answer} / dim = {}", emb.len());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    chat_message::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError},
    health_service::{HealthService, HealthStatus},
    services::{
        gemini_service::GeminiService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// A ready-to-use client for one provider.
#[derive(Debug, Clone)]
enum ProviderClient {
    Gemini(Arc<GeminiService>),
    OpenAI(Arc<OpenAiService>),
    Ollama(Arc<OllamaService>),
}

impl ProviderClient {
    fn build(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        Ok(match cfg.provider {
            LlmProvider::Gemini => Self::Gemini(Arc::new(GeminiService::new(cfg.clone())?)),
            LlmProvider::OpenAI => Self::OpenAI(Arc::new(OpenAiService::new(cfg.clone())?)),
            LlmProvider::Ollama => Self::Ollama(Arc::new(OllamaService::new(cfg.clone())?)),
        })
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        match self {
            Self::Gemini(cli) => cli.chat(messages).await,
            Self::OpenAI(cli) => cli.chat(messages).await,
            Self::Ollama(cli) => cli.chat(messages).await,
        }
    }

    async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self {
            Self::Gemini(cli) => cli.embeddings(input).await,
            Self::OpenAI(cli) => cli.embeddings(input).await,
            Self::Ollama(cli) => cli.embeddings(input).await,
        }
    }
}

/// Shared service that manages two logical LLM profiles: **chat** and **embedding**.
pub struct LlmServiceProfiles {
    chat_cfg: LlmModelConfig,
    embedding_cfg: LlmModelConfig,

    chat: ProviderClient,
    embedding: ProviderClient,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with both profiles.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either client cannot be built (wrong provider,
    /// missing API key, invalid endpoint) or the health client fails to initialize.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let chat_client = ProviderClient::build(&chat)?;
        let embedding_client = ProviderClient::build(&embedding)?;

        info!(
            chat_provider = chat.provider.as_str(),
            chat_model = %chat.model,
            embedding_provider = embedding.provider.as_str(),
            embedding_model = %embedding.model,
            "LLM profiles ready"
        );

        Ok(Self {
            chat_cfg: chat,
            embedding_cfg: embedding,
            chat: chat_client,
            embedding: embedding_client,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates a reply for an ordered message list using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        self.chat.chat(messages).await
    }

    /// Computes embeddings using the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        self.embedding.embeddings(input).await
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If the embedding profile equals the chat profile, it is checked only once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        list.push(self.chat_cfg.clone());
        if self.embedding_cfg != self.chat_cfg {
            list.push(self.embedding_cfg.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat_cfg, &self.embedding_cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn builds_clients_eagerly() {
        let svc = LlmServiceProfiles::new(ollama("llama3.1"), ollama("nomic-embed-text"), Some(1))
            .unwrap();
        let (chat, emb) = svc.profiles();
        assert_eq!(chat.model, "llama3.1");
        assert_eq!(emb.model, "nomic-embed-text");
    }

    #[test]
    fn missing_api_key_fails_at_construction() {
        let gemini = LlmModelConfig {
            provider: LlmProvider::Gemini,
            endpoint: "https://generativelanguage.googleapis.com".into(),
            ..ollama("gemini-2.5-flash")
        };
        let err = match LlmServiceProfiles::new(gemini, ollama("nomic-embed-text"), None) {
            Err(e) => e,
            Ok(_) => panic!("expected missing key error"),
        };
        assert!(err.is_config());
    }

    #[test]
    fn blank_model_is_rejected() {
        for (chat, emb) in [(ollama("  "), ollama("nomic-embed-text")), (ollama("llama3.1"), ollama(""))] {
            match LlmServiceProfiles::new(chat, emb, None) {
                Err(AiLlmError::Config(ConfigError::EmptyModel)) => {}
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("expected empty model error"),
            }
        }
    }
}
