//! HTTP server configuration.

use std::{path::PathBuf, time::Duration};

use ai_llm_service::error_handler::EnvLookup;

use crate::{core::session::DEFAULT_MAX_SESSIONS, error_handler::AppError};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/index.html";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub address: String,
    pub debug: bool,
    pub static_dir: PathBuf,
    pub template_path: PathBuf,
    pub session_ttl: Duration,
    /// Key material for signing session cookies; unsigned when absent.
    pub session_secret: Option<String>,
    pub max_sessions: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_API_ADDRESS.into(),
            debug: false,
            static_dir: DEFAULT_STATIC_DIR.into(),
            template_path: DEFAULT_TEMPLATE_PATH.into(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_secret: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ApiConfig {
    pub fn from_lookup(env: EnvLookup<'_>) -> Result<Self, AppError> {
        let dflt = Self::default();
        let get = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(v) => Duration::from_secs(v.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("SESSION_TTL_SECS must be an integer, got `{v}`"))
            })?),
            None => dflt.session_ttl,
        };
        let max_sessions = match get("SESSION_MAX") {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::Config(format!(
                        "SESSION_MAX must be a positive integer, got `{v}`"
                    )));
                }
            },
            None => dflt.max_sessions,
        };

        Ok(Self {
            address: get("API_ADDRESS").unwrap_or(dflt.address),
            debug: get("APP_DEBUG")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or(dflt.static_dir),
            template_path: get("TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(dflt.template_path),
            session_ttl,
            session_secret: get("SESSION_SECRET"),
            max_sessions,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(&|k| std::env::var(k).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let cfg = ApiConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(cfg.address, "127.0.0.1:5000");
        assert!(!cfg.debug);
        assert_eq!(cfg.session_ttl, Duration::from_secs(86_400));
        assert_eq!(cfg.max_sessions, 10_000);
        assert_eq!(cfg.session_secret, None);

        let cfg = ApiConfig::from_lookup(&|k| match k {
            "API_ADDRESS" => Some("0.0.0.0:8080".into()),
            "APP_DEBUG" => Some("True".into()),
            "SESSION_TTL_SECS" => Some("60".into()),
            "SESSION_MAX" => Some("50".into()),
            "SESSION_SECRET" => Some("hunter2".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.address, "0.0.0.0:8080");
        assert!(cfg.debug);
        assert_eq!(cfg.session_ttl, Duration::from_secs(60));
        assert_eq!(cfg.max_sessions, 50);
        assert_eq!(cfg.session_secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn bad_ttl_is_rejected() {
        let err = ApiConfig::from_lookup(&|k| (k == "SESSION_TTL_SECS").then(|| "soon".into()))
            .unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
    }

    #[test]
    fn zero_session_cap_is_rejected() {
        for v in ["0", "many"] {
            let err = ApiConfig::from_lookup(&|k| (k == "SESSION_MAX").then(|| v.into()))
                .unwrap_err();
            assert!(err.to_string().contains("SESSION_MAX"), "{v}");
        }
    }
}
