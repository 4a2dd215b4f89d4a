//! Provider-agnostic access to hosted language models.
//!
//! The crate exposes:
//! - [`config`] — model configs and env-driven defaults
//! - [`services`] — thin HTTP clients for Gemini, OpenAI and Ollama
//! - [`service_profiles::LlmServiceProfiles`] — the long-lived `chat` + `embedding` pair
//! - [`health_service::HealthService`] — best-effort provider checks
//!
//! All fallible operations return [`error_handler::AiLlmError`].

pub mod chat_message;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;

pub use chat_message::{ChatMessage, ChatRole};
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use health_service::{HealthService, HealthStatus};
pub use service_profiles::LlmServiceProfiles;
