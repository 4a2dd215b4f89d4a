//! POST /chat — answers a visitor's question in the context of their session.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::{chat_request::ChatRequest, chat_response::ChatResponse},
};

/// Handler: POST /chat
///
/// Order of checks: chatbot availability (503), message presence (400),
/// generation (500 on failure). History is extended only on success.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/chat \
///   -H 'content-type: application/json' \
///   -d '{"message":"What projects have you worked on?"}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Some(pipeline) = state.pipeline.clone() else {
        return Err(AppError::Unavailable);
    };

    let Json(req) = body?;
    let Some(message) = req.message() else {
        return Err(AppError::BadRequest("No message provided".into()));
    };

    let id = state.sessions.session_id_or_new(&headers);
    let history = state.sessions.history(id).await;

    let Some(answer) = pipeline.answer(message, &history).await else {
        warn!(session = %id, "answer generation failed");
        return Err(AppError::Generation);
    };

    state.sessions.append(id, message, &answer).await;
    info!(session = %id, turns = history.len() + 1, "chat answered");

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(id))],
        Json(ChatResponse { answer }),
    ))
}
