//! HTTP surface of the portfolio chatbot.

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::{path::Path, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    core::{app_state::AppState, config::ApiConfig},
    error_handler::AppError,
    middleware_layer::request_id::propagate_request_id,
    routes::{chat::chat_route::chat, health::health_route::health, landing::landing_route::landing},
};

/// Builds the application router over shared state.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `cfg.address` and serves until Ctrl+C.
pub async fn start(cfg: &ApiConfig, state: Arc<AppState>) -> Result<(), AppError> {
    if cfg.debug {
        warn!("debug mode enabled");
    }
    let app = router(state, &cfg.static_dir);

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(AppError::Bind)?;
    info!("Listening on http://{}", cfg.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("Server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
