//! API error types.
//!
//! Client-side problems map to 400, everything that goes wrong while
//! processing an accepted upload maps to 500. Bodies are plain text.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use fdet_media::MediaError;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::is_production_environment;
use crate::metrics;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not multipart form data, or carries no parts at all.
    #[error("{0}")]
    MalformedRequest(String),

    /// No file under the image field.
    #[error("No image uploaded. Please try again")]
    MissingInput,

    /// An uploaded part could not be read.
    #[error("Failed to get media form file: {0}")]
    Stream(String),

    #[error("Unable to store uploaded image: {0}")]
    Storage(MediaError),

    #[error("Error on face detection: {0}")]
    Detection(MediaError),

    #[error("Error creating image output: {0}")]
    Annotation(MediaError),

    #[error("Error encoding output: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) | ApiError::MissingInput | ApiError::Stream(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Storage(_)
            | ApiError::Detection(_)
            | ApiError::Annotation(_)
            | ApiError::Encoding(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest(_) => "malformed_request",
            ApiError::MissingInput => "missing_input",
            ApiError::Stream(_) => "stream",
            ApiError::Storage(_) => "storage",
            ApiError::Detection(_) => "detection",
            ApiError::Annotation(_) => "annotation",
            ApiError::Encoding(_) => "encoding",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Message without the underlying cause.
    fn public_message(&self) -> String {
        match self {
            ApiError::Storage(_) => "Unable to store uploaded image".to_string(),
            ApiError::Detection(_) => "Error on face detection".to_string(),
            ApiError::Annotation(_) => "Error creating image output".to_string(),
            ApiError::Encoding(_) => "Error encoding output".to_string(),
            ApiError::Internal(_) => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::TempFileCreate(_)
            | MediaError::TempFileWrite(_)
            | MediaError::TempFileRead(_) => ApiError::Storage(err),
            MediaError::DecodeFailed(_)
            | MediaError::ModelNotFound(_)
            | MediaError::ModelInvalid(_)
            | MediaError::DetectionFailed(_) => ApiError::Detection(err),
            MediaError::EncodeFailed(_) => ApiError::Annotation(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        metrics::record_request_failure(self.kind());

        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            warn!(kind = self.kind(), error = %self, "Request rejected");
        }

        // Don't expose internal error details in production
        let detail = if status.is_server_error()
            && is_production_environment(&std::env::var("ENVIRONMENT").unwrap_or_default())
        {
            self.public_message()
        } else {
            self.to_string()
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            detail,
        )
            .into_response()
    }
}
