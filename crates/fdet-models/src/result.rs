//! Per-image and per-request detection results.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rect::FaceRect;

/// Status reported for a fully processed request.
pub const STATUS_SUCCESS: &str = "success";

/// Outcome of the detect/annotate pipeline for one uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionResult {
    /// Client-supplied file name of the upload
    pub image_name: String,
    /// Number of reported faces
    pub total_faces: usize,
    /// One rectangle per reported face, in detection order
    pub faces: Vec<FaceRect>,
    /// Elapsed processing time for this image
    pub time: String,
    /// Annotated JPEG, base64-encoded (only when requested)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl DetectionResult {
    pub fn new(image_name: impl Into<String>, faces: Vec<FaceRect>, elapsed: Duration) -> Self {
        Self {
            image_name: image_name.into(),
            total_faces: faces.len(),
            faces,
            time: format_elapsed(elapsed),
            image_base64: None,
        }
    }

    pub fn with_image_base64(mut self, encoded: String) -> Self {
        self.image_base64 = Some(encoded);
        self
    }
}

/// Response body for a processed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregateResult {
    pub status: String,
    pub total_time: String,
    pub total_images: usize,
    pub data: Vec<DetectionResult>,
}

impl AggregateResult {
    /// Successful batch with its total elapsed time.
    pub fn success(data: Vec<DetectionResult>, elapsed: Duration) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            total_time: format_elapsed(elapsed),
            total_images: data.len(),
            data,
        }
    }

    /// Total faces across all images.
    pub fn total_faces(&self) -> usize {
        self.data.iter().map(|d| d.total_faces).sum()
    }
}

/// Render a duration with its unit suffix, e.g. `"12.5ms"` or `"1.2s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:?}", elapsed)
}
