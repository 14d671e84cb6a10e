//! Axum HTTP function for face detection.
//!
//! This crate provides:
//! - Multipart upload handling under the `image` form field
//! - Sequential, fail-fast detect and annotate orchestration
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{DetectOptions, DetectionService, Upload, UploadBatch};
pub use state::AppState;
