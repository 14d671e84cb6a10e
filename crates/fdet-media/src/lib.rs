#![deny(unreachable_patterns)]
//! Image handling for the face detection function.
//!
//! This crate provides:
//! - Scoped temporary files for uploads and encoded output
//! - A pluggable face detector trait with a cascade backend
//! - IoU clustering of overlapping detections
//! - Annotation of reported faces and JPEG encoding

pub mod annotate;
pub mod config;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod temp_store;

pub use annotate::{Annotation, Annotator};
pub use config::{AnnotatorConfig, DetectorConfig};
pub use detection::{cluster_detections, CascadeDetector, FaceDetector};
pub use error::{MediaError, MediaResult};
pub use pipeline::{decode_image, DetectedImage, FacePipeline};
pub use temp_store::{TempImage, TempStore};
