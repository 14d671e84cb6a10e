//! Cascade classifier backend built on the `rustface` engine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use fdet_models::Detection;
use image::GrayImage;
use tracing::{debug, info};

use super::FaceDetector;
use crate::config::DetectorConfig;
use crate::error::{MediaError, MediaResult};

/// Smallest window the engine accepts.
const ENGINE_MIN_FACE_SIZE: u32 = 20;

/// Engine-side candidate threshold. Reporting uses the annotator threshold.
const ENGINE_SCORE_THRESH: f64 = 2.0;

/// Engine parameters derived from [`DetectorConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    pub min_face_size: u32,
    pub max_face_size: u32,
    /// Sliding step in pixels, both axes
    pub slide_step: u32,
    /// Image shrink factor between pyramid levels, in (0, 1)
    pub pyramid_scale_factor: f32,
}

impl From<&DetectorConfig> for CascadeParams {
    fn from(config: &DetectorConfig) -> Self {
        let min_face_size = config.min_size.max(ENGINE_MIN_FACE_SIZE);
        let max_face_size = config.max_size.max(min_face_size);

        // Growing the window by `scale_factor` is equivalent to shrinking
        // the image by its inverse.
        let pyramid_scale_factor = if config.scale_factor > 1.0 {
            (1.0 / config.scale_factor) as f32
        } else {
            0.8
        };

        let slide_step = (min_face_size as f64 * config.shift_factor).round().max(1.0) as u32;

        Self {
            min_face_size,
            max_face_size,
            slide_step,
            pyramid_scale_factor: pyramid_scale_factor.clamp(0.01, 0.99),
        }
    }
}

/// Face detector backed by a SeetaFace cascade model.
///
/// The model is parsed once; each detection call gets its own engine
/// instance, so one detector can serve concurrent requests.
pub struct CascadeDetector {
    model: rustface::Model,
    params: CascadeParams,
}

impl CascadeDetector {
    /// Load the cascade model from `config.model_path`.
    pub fn from_config(config: &DetectorConfig) -> MediaResult<Self> {
        Self::from_file(&config.model_path, CascadeParams::from(config))
    }

    pub fn from_file(path: impl AsRef<Path>, params: CascadeParams) -> MediaResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MediaError::model_not_found(format!("{}: {}", path.display(), e)))?;

        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| MediaError::model_invalid(format!("{}: {}", path.display(), e)))?;

        info!(
            model = %path.display(),
            min_face_size = params.min_face_size,
            max_face_size = params.max_face_size,
            slide_step = params.slide_step,
            pyramid_scale_factor = params.pyramid_scale_factor,
            "Loaded cascade model"
        );

        Ok(Self { model, params })
    }
}

impl FaceDetector for CascadeDetector {
    fn detect(&self, gray: &GrayImage) -> MediaResult<Vec<Detection>> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(MediaError::detection_failed("image has zero dimensions"));
        }

        let mut engine = rustface::create_detector_with_model(self.model.clone());
        engine.set_min_face_size(self.params.min_face_size);
        engine.set_max_face_size(self.params.max_face_size);
        engine.set_pyramid_scale_factor(self.params.pyramid_scale_factor);
        engine.set_slide_window_step(self.params.slide_step, self.params.slide_step);
        engine.set_score_thresh(ENGINE_SCORE_THRESH);

        let faces = engine.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        let detections: Vec<Detection> = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                detection_from_bbox(bbox.x(), bbox.y(), bbox.width(), bbox.height(), face.score())
            })
            .collect();

        debug!(width, height, raw = detections.len(), "Cascade pass complete");

        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "rustface"
    }
}

/// Center/scale window for an engine bounding box.
fn detection_from_bbox(x: i32, y: i32, width: u32, height: u32, score: f64) -> Detection {
    let (w, h) = (width as i32, height as i32);
    Detection::new(y + h / 2, x + w / 2, w.max(h), score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_default_config() {
        let params = CascadeParams::from(&DetectorConfig::default());
        assert_eq!(params.min_face_size, 20);
        assert_eq!(params.max_face_size, 2000);
        assert_eq!(params.slide_step, 2);
        assert!((params.pyramid_scale_factor - 1.0 / 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_params_are_clamped() {
        let config = DetectorConfig {
            min_size: 4,
            max_size: 10,
            shift_factor: 0.0,
            scale_factor: 0.5,
            ..DetectorConfig::default()
        };
        let params = CascadeParams::from(&config);
        assert_eq!(params.min_face_size, 20);
        assert_eq!(params.max_face_size, 20);
        assert_eq!(params.slide_step, 1);
        assert_eq!(params.pyramid_scale_factor, 0.8);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DetectorConfig {
            model_path: dir.path().join("facefinder.bin"),
            ..DetectorConfig::default()
        };

        let err = CascadeDetector::from_config(&config).err().unwrap();
        assert!(matches!(err, MediaError::ModelNotFound(_)));
    }

    #[test]
    fn test_empty_model_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("facefinder.bin");
        std::fs::write(&path, b"").unwrap();

        let result = CascadeDetector::from_file(&path, CascadeParams::from(&DetectorConfig::default()));
        assert!(matches!(result, Err(MediaError::ModelInvalid(_))));
    }

    #[test]
    fn test_bbox_maps_to_center_and_scale() {
        let det = detection_from_bbox(10, 20, 40, 40, 7.5);
        assert_eq!((det.row, det.col, det.scale), (40, 30, 40));
        assert_eq!(det.score, 7.5);

        // Non-square boxes keep their center and take the longer side
        let det = detection_from_bbox(-4, 0, 21, 30, 1.0);
        assert_eq!((det.row, det.col, det.scale), (15, 6, 30));
    }

    /// Needs the SeetaFace model at `CASCADE_MODEL_PATH` and a photo with
    /// faces at `CASCADE_TEST_IMAGE`. The rustface sources ship both
    /// (`model/seeta_fd_frontal_v1.0.bin` and a sample picture).
    #[test]
    #[ignore = "requires a cascade model and a photo with faces"]
    fn test_real_model_detects_faces() {
        let config = DetectorConfig::from_env();
        let image_path = std::env::var("CASCADE_TEST_IMAGE").expect("CASCADE_TEST_IMAGE not set");
        let detector = CascadeDetector::from_config(&config).unwrap();

        let gray = image::open(&image_path).unwrap().to_luma8();
        let detections = detector.detect(&gray).unwrap();
        assert!(!detections.is_empty());

        // Same engine setup, queried directly, to check the box mapping
        let mut engine = rustface::create_detector_with_model(detector.model.clone());
        engine.set_min_face_size(detector.params.min_face_size);
        engine.set_max_face_size(detector.params.max_face_size);
        engine.set_pyramid_scale_factor(detector.params.pyramid_scale_factor);
        engine.set_slide_window_step(detector.params.slide_step, detector.params.slide_step);
        engine.set_score_thresh(ENGINE_SCORE_THRESH);
        let faces = engine.detect(&rustface::ImageData::new(
            gray.as_raw(),
            gray.width(),
            gray.height(),
        ));

        assert_eq!(faces.len(), detections.len());
        for (face, det) in faces.iter().zip(&detections) {
            let bbox = face.bbox();
            assert_eq!(det.col, bbox.x() + bbox.width() as i32 / 2);
            assert_eq!(det.row, bbox.y() + bbox.height() as i32 / 2);
            assert_eq!(det.scale, bbox.width().max(bbox.height()) as i32);
            assert!(det.score >= ENGINE_SCORE_THRESH);
        }

        let reported = detections.iter().filter(|d| d.exceeds(5.0)).count();
        assert!(reported >= 1);
    }

    #[test]
    #[ignore = "requires a cascade model"]
    fn test_real_model_handles_tiny_images() {
        let detector = CascadeDetector::from_config(&DetectorConfig::from_env()).unwrap();

        for (width, height) in [(1, 1), (10, 10), (19, 40), (3000, 1)] {
            let gray = GrayImage::new(width, height);
            assert!(detector.detect(&gray).unwrap().is_empty());
        }
    }
}
