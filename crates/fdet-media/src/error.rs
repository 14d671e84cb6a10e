//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while persisting, detecting or annotating an image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unable to create temp file: {0}")]
    TempFileCreate(String),

    #[error("Unable to write temp file: {0}")]
    TempFileWrite(String),

    #[error("Unable to read temp file: {0}")]
    TempFileRead(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Cascade model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid cascade model: {0}")]
    ModelInvalid(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Failed to encode annotated image: {0}")]
    EncodeFailed(String),
}

impl MediaError {
    pub fn temp_file_create(message: impl Into<String>) -> Self {
        Self::TempFileCreate(message.into())
    }

    pub fn temp_file_write(message: impl Into<String>) -> Self {
        Self::TempFileWrite(message.into())
    }

    pub fn temp_file_read(message: impl Into<String>) -> Self {
        Self::TempFileRead(message.into())
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed(message.into())
    }

    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    pub fn model_invalid(message: impl Into<String>) -> Self {
        Self::ModelInvalid(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailed(message.into())
    }

    /// Whether the failure came from temp-file handling.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::TempFileCreate(_) | Self::TempFileWrite(_) | Self::TempFileRead(_)
        )
    }
}
