//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness of the upload scratch space.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub temp_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check endpoint (readiness probe).
/// Uploads are staged on disk, so the function is ready only while a temp
/// file can be created in the configured directory.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let temp_dir = state.config.temp_dir.display().to_string();

    match state.detection.temp_store().scratch("ready", "") {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                temp_dir,
                error: None,
            }),
        ),
        Err(e) => {
            warn!(temp_dir = %temp_dir, error = %e, "Temp directory not writable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "unavailable",
                    temp_dir,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
