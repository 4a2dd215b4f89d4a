//! GET / — landing page; starts a fresh chat session.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{Html, IntoResponse},
};
use tracing::debug;

use crate::core::app_state::AppState;

/// Handler: GET /
///
/// Reuses the caller's session id when present, clears its history and
/// (re)issues the session cookie.
pub async fn landing(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let id = state.sessions.session_id_or_new(&headers);
    state.sessions.reset(id).await;
    debug!(session = %id, "session reset");

    (
        [(header::SET_COOKIE, state.sessions.cookie(id))],
        Html(state.landing_html.clone()),
    )
}
