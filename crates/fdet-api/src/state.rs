//! Application state.

use std::sync::Arc;

use fdet_media::{CascadeDetector, FaceDetector, MediaResult, TempStore};
use tracing::info;

use crate::config::ApiConfig;
use crate::services::DetectionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub detection: DetectionService,
}

impl AppState {
    /// Create new application state, loading the cascade model once.
    pub fn new(config: ApiConfig) -> MediaResult<Self> {
        let detector = CascadeDetector::from_config(&config.detector)?;
        info!(
            model = %config.detector.model_path.display(),
            min_size = config.detector.min_size,
            max_size = config.detector.max_size,
            "Cascade detector ready"
        );
        Ok(Self::with_detector(config, Arc::new(detector)))
    }

    /// Create state around an already constructed detector.
    pub fn with_detector(config: ApiConfig, detector: Arc<dyn FaceDetector>) -> Self {
        let detection = DetectionService::new(
            detector,
            &config.detector,
            config.annotator.clone(),
            TempStore::new(config.temp_dir.clone()),
        );

        Self { config, detection }
    }
}
