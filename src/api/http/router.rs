// src/api/http/router.rs
// HTTP router composition for the relay endpoints

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    analyze::analyze_handler,
    chat::chat_handler,
    status::{health_handler, ollama_status_handler},
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/ollama-status", get(ollama_status_handler))
        .route("/api/chat", post(chat_handler))
        .route(
            "/api/analyze",
            post(analyze_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
