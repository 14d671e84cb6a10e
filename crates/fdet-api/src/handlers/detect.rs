//! Face detection handler.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use fdet_models::MarkerShape;
use serde::Deserialize;
use tracing::{info, Span};

use crate::error::{ApiError, ApiResult};
use crate::services::{DetectOptions, UploadBatch};
use crate::state::AppState;

/// Optional query parameters of a detection request.
#[derive(Debug, Default, Deserialize)]
pub struct DetectQuery {
    pub shape: Option<MarkerShape>,
    pub include_image: Option<bool>,
}

/// Detect faces on every image uploaded under the `image` form field.
pub async fn detect_faces(
    State(state): State<AppState>,
    query: Result<Query<DetectQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::malformed(e.body_text()))?;
    let multipart = multipart.map_err(|e| ApiError::malformed(e.body_text()))?;

    let defaults = state.detection.default_options();
    let options = DetectOptions {
        shape: query.shape.unwrap_or(defaults.shape),
        include_image: query.include_image.unwrap_or(defaults.include_image),
    };

    let batch = UploadBatch::from_multipart(multipart).await?;
    info!(images = batch.len(), shape = %options.shape, "Processing upload batch");

    let service = state.detection.clone();
    let span = Span::current();
    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| service.process_batch(&batch, &options))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Detection task failed: {}", e)))??;

    let body = serde_json::to_vec(&result)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
