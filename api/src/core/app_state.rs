use std::{fs, path::Path, sync::Arc};

use ai_llm_service::{AiLlmError, LlmServiceProfiles};
use contextor::{ChatPipeline, ContextMode, ContextorConfig};
use tracing::{error, info, warn};

use crate::core::{config::ApiConfig, session::SessionStore};

/// Served when the landing template cannot be read.
pub const FALLBACK_LANDING_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Portfolio</title></head>
<body>
<h1>Portfolio</h1>
<p>Ask the assistant anything by POSTing <code>{"message": "..."}</code> to <code>/chat</code>.</p>
</body>
</html>
"#;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// `None` when startup could not build the pipeline; chat then answers 503.
    pub pipeline: Option<Arc<ChatPipeline>>,
    /// Provider pair, kept for `/health` checks.
    pub llm: Option<Arc<LlmServiceProfiles>>,
    pub sessions: SessionStore,
    pub landing_html: String,
    pub context_mode: ContextMode,
}

impl AppState {
    pub fn new(
        pipeline: Option<Arc<ChatPipeline>>,
        llm: Option<Arc<LlmServiceProfiles>>,
        sessions: SessionStore,
        landing_html: String,
        context_mode: ContextMode,
    ) -> Self {
        Self {
            pipeline,
            llm,
            sessions,
            landing_html,
            context_mode,
        }
    }

    /// Builds the state at startup.
    ///
    /// Never fails: provider or pipeline errors are logged and leave the
    /// chatbot unavailable while the rest of the server keeps running.
    pub fn bootstrap(
        api_cfg: &ApiConfig,
        ctx_cfg: &ContextorConfig,
        llm: Result<LlmServiceProfiles, AiLlmError>,
    ) -> Self {
        let llm = match llm {
            Ok(svc) => Some(Arc::new(svc)),
            Err(e) => {
                error!(error = %e, "language model providers are not configured");
                None
            }
        };

        let pipeline = llm.as_ref().and_then(|svc| {
            match ChatPipeline::from_config(ctx_cfg, svc.clone()) {
                Ok(p) => Some(Arc::new(p)),
                Err(e) => {
                    error!(error = %e, mode = %ctx_cfg.mode, "failed to initialize chat pipeline");
                    None
                }
            }
        });
        if pipeline.is_none() {
            warn!("chatbot is not available; POST /chat will answer 503");
        }

        let mut sessions =
            SessionStore::new(api_cfg.session_ttl).with_max_sessions(api_cfg.max_sessions);
        match api_cfg.session_secret.as_deref() {
            Some(secret) => sessions = sessions.with_secret(secret),
            None => warn!("SESSION_SECRET not set; session cookies are unsigned"),
        }

        Self::new(
            pipeline,
            llm,
            sessions,
            load_landing_page(&api_cfg.template_path),
            ctx_cfg.mode,
        )
    }

    pub fn chatbot_available(&self) -> bool {
        self.pipeline.is_some()
    }
}

/// Reads the landing template, falling back to a built-in page.
pub fn load_landing_page(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(html) => {
            info!("Loaded landing page from {:?}", path);
            html
        }
        Err(e) => {
            warn!("landing page {:?} unavailable ({e}); using built-in page", path);
            FALLBACK_LANDING_HTML.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let html = load_landing_page(&dir.path().join("nope.html"));
        assert_eq!(html, FALLBACK_LANDING_HTML);

        let p = dir.path().join("index.html");
        fs::write(&p, "<h1>hi</h1>").unwrap();
        assert_eq!(load_landing_page(&p), "<h1>hi</h1>");
    }

    #[test]
    fn provider_failure_leaves_chatbot_unavailable() {
        let state = AppState::bootstrap(
            &ApiConfig::default(),
            &ContextorConfig::default(),
            Err(AiLlmError::Config(ai_llm_service::ConfigError::MissingVar(
                "CHAT_MODEL",
            ))),
        );
        assert!(!state.chatbot_available());
        assert!(state.llm.is_none());
    }
}
