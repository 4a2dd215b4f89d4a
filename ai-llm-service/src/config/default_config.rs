//! Default LLM configs loaded from environment variables.
//!
//! Two roles are configured:
//!
//! - **Chat**      → the model that writes answers
//! - **Embedding** → the model that turns text into vectors for retrieval
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`          = chat provider (`gemini` | `openai` | `ollama`, default `gemini`)
//! - `EMBEDDING_KIND`    = embedding provider (defaults to `LLM_KIND`)
//! - `CHAT_MODEL`        = chat model id (provider default if unset)
//! - `CHAT_TEMPERATURE`  = sampling temperature (default `0.7`)
//! - `LLM_MAX_TOKENS`    = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`  = request timeout (default 60)
//! - `EMBEDDING_MODEL`   = embedding model id (provider default if unset)
//!
//! Gemini: `GOOGLE_API_KEY` or `GEMINI_API_KEY` (mandatory), `GEMINI_URL` (optional).
//! OpenAI: `OPENAI_API_KEY` (mandatory), `OPENAI_URL` (optional).
//! Ollama: `OLLAMA_URL` or `OLLAMA_PORT` (mandatory).

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, EnvLookup, env_opt, env_opt_f32, env_opt_u32, env_opt_u64,
        must_env, validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_chat_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Gemini => "gemini-2.5-flash",
        LlmProvider::OpenAI => "gpt-4o-mini",
        LlmProvider::Ollama => "llama3.1",
    }
}

fn default_embedding_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Gemini => "text-embedding-004",
        LlmProvider::OpenAI => "text-embedding-3-small",
        LlmProvider::Ollama => "nomic-embed-text",
    }
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint(env: EnvLookup<'_>) -> Result<String, AiLlmError> {
    if let Some(url) = env_opt(env, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt(env, "OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Endpoint and credentials for a provider.
fn provider_access(
    env: EnvLookup<'_>,
    provider: LlmProvider,
) -> Result<(String, Option<String>), AiLlmError> {
    match provider {
        LlmProvider::Gemini => {
            let key = env_opt(env, "GOOGLE_API_KEY")
                .or_else(|| env_opt(env, "GEMINI_API_KEY"))
                .ok_or(ConfigError::MissingVar("GOOGLE_API_KEY or GEMINI_API_KEY"))?;
            let url = env_opt(env, "GEMINI_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.into());
            validate_http_endpoint("GEMINI_URL", &url)?;
            Ok((url, Some(key)))
        }
        LlmProvider::OpenAI => {
            let key = must_env(env, "OPENAI_API_KEY")?;
            let url = env_opt(env, "OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.into());
            validate_http_endpoint("OPENAI_URL", &url)?;
            Ok((url, Some(key)))
        }
        LlmProvider::Ollama => Ok((ollama_endpoint(env)?, None)),
    }
}

fn provider_kind(env: EnvLookup<'_>, var: &str) -> Result<Option<LlmProvider>, AiLlmError> {
    match env_opt(env, var) {
        Some(raw) => Ok(Some(raw.parse::<LlmProvider>()?)),
        None => Ok(None),
    }
}

/// Constructs the **chat** config.
///
/// # Defaults
/// - provider `gemini`, model per provider (`gemini-2.5-flash` for Gemini)
/// - `temperature = 0.7`
/// - `timeout_secs = 60`
pub fn config_chat(env: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_kind(env, "LLM_KIND")?.unwrap_or(LlmProvider::Gemini);
    let (endpoint, api_key) = provider_access(env, provider)?;
    let model = env_opt(env, "CHAT_MODEL").unwrap_or_else(|| default_chat_model(provider).into());

    let temperature = env_opt_f32(env, "CHAT_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: env_opt_u32(env, "LLM_MAX_TOKENS")?,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(env_opt_u64(env, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Constructs the **embedding** config.
///
/// Uses `EMBEDDING_KIND` when set, otherwise the chat provider.
///
/// # Defaults
/// - `temperature = Some(0.0)` (ignored by embedding endpoints)
/// - `timeout_secs = Some(30)`
pub fn config_embedding(env: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let provider = match provider_kind(env, "EMBEDDING_KIND")? {
        Some(p) => p,
        None => provider_kind(env, "LLM_KIND")?.unwrap_or(LlmProvider::Gemini),
    };
    let (endpoint, api_key) = provider_access(env, provider)?;
    let model = env_opt(env, "EMBEDDING_MODEL")
        .unwrap_or_else(|| default_embedding_model(provider).into());

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}

/// [`config_chat`] over the process environment.
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    config_chat(&|k| std::env::var(k).ok())
}

/// [`config_embedding`] over the process environment.
pub fn config_embedding_from_env() -> Result<LlmModelConfig, AiLlmError> {
    config_embedding(&|k| std::env::var(k).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn gemini_is_the_default_chat_provider() {
        let env = env_of(&[("GOOGLE_API_KEY", "key")]);
        let cfg = config_chat(&env).unwrap();
        assert_eq!(cfg.provider, LlmProvider::Gemini);
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.temperature, Some(0.7));
        assert_eq!(cfg.endpoint, DEFAULT_GEMINI_URL);
        assert_eq!(cfg.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn missing_credentials_is_a_config_error() {
        let env = env_of(&[("LLM_KIND", "openai")]);
        let err = config_chat(&env).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn ollama_port_builds_local_endpoint() {
        let env = env_of(&[
            ("LLM_KIND", "ollama"),
            ("OLLAMA_PORT", "11434"),
            ("CHAT_MODEL", "qwen3:8b"),
            ("CHAT_TEMPERATURE", "0.2"),
        ]);
        let cfg = config_chat(&env).unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert_eq!(cfg.model, "qwen3:8b");
        assert_eq!(cfg.temperature, Some(0.2));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let env = env_of(&[("GOOGLE_API_KEY", "key"), ("CHAT_TEMPERATURE", "7")]);
        assert!(config_chat(&env).is_err());
    }

    #[test]
    fn embedding_kind_overrides_chat_kind() {
        let env = env_of(&[
            ("LLM_KIND", "gemini"),
            ("GEMINI_API_KEY", "key"),
            ("EMBEDDING_KIND", "ollama"),
            ("OLLAMA_URL", "http://ollama:11434"),
        ]);
        let cfg = config_embedding(&env).unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.model, "nomic-embed-text");
        assert_eq!(cfg.endpoint, "http://ollama:11434");
    }
}
