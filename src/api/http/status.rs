// src/api/http/status.rs
// Liveness of the relay itself and reachability of Ollama

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::UpstreamError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaStatus {
    pub status: ServiceStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl OllamaStatus {
    fn online(version: String) -> Self {
        Self {
            status: ServiceStatus::Online,
            message: "Ollama service is running".to_string(),
            version: Some(version),
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: ServiceStatus::Error,
            message,
            version: None,
        }
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Always 200; the body says whether Ollama answered.
pub async fn ollama_status_handler(State(state): State<AppState>) -> Json<OllamaStatus> {
    let status = match state.ollama.version().await {
        Ok(version) => OllamaStatus::online(version),
        Err(UpstreamError::BadStatus { status, .. }) => {
            OllamaStatus::error(format!("Ollama service returned status code {status}"))
        }
        Err(err) => {
            warn!(error = %err, "Ollama status probe failed");
            OllamaStatus::error(format!("Failed to connect to Ollama service: {err}"))
        }
    };
    Json(status)
}
