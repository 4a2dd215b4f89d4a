//! GET /health — liveness plus chatbot and provider status.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chatbot_available: bool,
    pub context_mode: &'static str,
    pub providers: Vec<HealthStatus>,
}

/// Handler: GET /health
///
/// Always 200 while the process serves requests; details live in the body.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let providers = match &state.llm {
        Some(svc) => svc.health_all().await,
        None => Vec::new(),
    };

    Json(HealthResponse {
        status: "ok",
        chatbot_available: state.chatbot_available(),
        context_mode: state.context_mode.as_str(),
        providers,
    })
}
