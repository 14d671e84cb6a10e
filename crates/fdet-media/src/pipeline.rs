//! Detect stage of the per-image pipeline.

use std::path::Path;
use std::sync::Arc;

use fdet_models::Detection;
use image::io::Reader as ImageReader;
use image::DynamicImage;
use tracing::debug;

use crate::detection::{cluster_detections, FaceDetector};
use crate::error::{MediaError, MediaResult};

/// Decoded image together with its clustered detections.
#[derive(Debug, Clone)]
pub struct DetectedImage {
    pub image: DynamicImage,
    pub detections: Vec<Detection>,
}

/// Decodes an image file, runs the detector on its grayscale version and
/// clusters the raw detections.
#[derive(Clone)]
pub struct FacePipeline {
    detector: Arc<dyn FaceDetector>,
    iou_threshold: f64,
}

impl FacePipeline {
    pub fn new(detector: Arc<dyn FaceDetector>, iou_threshold: f64) -> Self {
        Self {
            detector,
            iou_threshold,
        }
    }

    /// Detect faces in the image stored at `path`.
    pub fn detect(&self, path: &Path) -> MediaResult<DetectedImage> {
        let image = decode_image(path)?;
        let gray = image.to_luma8();

        let raw = self.detector.detect(&gray)?;
        let raw_count = raw.len();
        let detections = cluster_detections(raw, self.iou_threshold);

        debug!(
            backend = self.detector.name(),
            width = gray.width(),
            height = gray.height(),
            raw = raw_count,
            clustered = detections.len(),
            "Detection complete"
        );

        Ok(DetectedImage { image, detections })
    }
}

/// Decode the image at `path`, sniffing the format from its content.
pub fn decode_image(path: &Path) -> MediaResult<DynamicImage> {
    ImageReader::open(path)
        .map_err(|e| MediaError::temp_file_read(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| MediaError::temp_file_read(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| MediaError::decode_failed(e.to_string()))
}
