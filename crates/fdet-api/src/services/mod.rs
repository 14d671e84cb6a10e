//! Business logic services.

pub mod detection;
pub mod upload;

pub use detection::{DetectOptions, DetectionService};
pub use upload::{Upload, UploadBatch, IMAGE_FIELD};
