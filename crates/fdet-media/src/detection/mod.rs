//! Face detection.
//!
//! The classifier itself is pluggable: anything implementing [`FaceDetector`]
//! can be handed to the pipeline. The shipped backend is [`CascadeDetector`].
//! Raw detections are merged by [`cluster_detections`].

mod cascade;
mod cluster;

pub use cascade::{CascadeDetector, CascadeParams};
pub use cluster::cluster_detections;

use fdet_models::Detection;
use image::GrayImage;

use crate::error::MediaResult;

/// Pluggable face detection backend.
#[cfg_attr(test, mockall::automock)]
pub trait FaceDetector: Send + Sync {
    /// Run the classifier over a grayscale image and return raw detections.
    fn detect(&self, gray: &GrayImage) -> MediaResult<Vec<Detection>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str {
        "custom"
    }
}
