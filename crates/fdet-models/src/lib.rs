//! Shared data models for the face detection function.
//!
//! This crate provides Serde-serializable types for:
//! - Raw and clustered face detections
//! - Bounding rectangles in image pixel space
//! - Per-image and per-request detection results
//! - Annotation marker shapes

pub mod detection;
pub mod marker;
pub mod rect;
pub mod result;

// Re-export common types
pub use detection::Detection;
pub use marker::{MarkerShape, MarkerShapeParseError};
pub use rect::{FaceRect, Point, RectEncoding, RectEncodingParseError};
pub use result::{format_elapsed, AggregateResult, DetectionResult, STATUS_SUCCESS};
