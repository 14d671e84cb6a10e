//! Detector and annotator configuration.

use std::path::PathBuf;
use std::str::FromStr;

use fdet_models::{MarkerShape, RectEncoding};

/// Default location of the cascade model.
pub const DEFAULT_MODEL_PATH: &str = "./data/seeta_fd_frontal_v1.0.bin";

/// Cascade detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the binary cascade model
    pub model_path: PathBuf,
    /// Smallest detection window in pixels
    pub min_size: u32,
    /// Largest detection window in pixels
    pub max_size: u32,
    /// Window shift as a fraction of the window size
    pub shift_factor: f64,
    /// Window growth between pyramid levels
    pub scale_factor: f64,
    /// IoU above which raw detections are merged
    pub iou_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            min_size: 20,
            max_size: 2000,
            shift_factor: 0.1,
            scale_factor: 1.1,
            iou_threshold: 0.18,
        }
    }
}

impl DetectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("CASCADE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            min_size: env_or("DETECT_MIN_SIZE", defaults.min_size),
            max_size: env_or("DETECT_MAX_SIZE", defaults.max_size),
            shift_factor: env_or("DETECT_SHIFT_FACTOR", defaults.shift_factor),
            scale_factor: env_or("DETECT_SCALE_FACTOR", defaults.scale_factor),
            iou_threshold: env_or("DETECT_IOU_THRESHOLD", defaults.iou_threshold),
        }
    }
}

/// Annotation configuration.
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Detections must score strictly above this to be reported
    pub score_threshold: f64,
    /// Default marker shape
    pub shape: MarkerShape,
    /// Outline width in pixels
    pub stroke_width: f32,
    /// Outline color (RGB)
    pub color: [u8; 3],
    /// JPEG quality of the annotated image (1-100)
    pub jpeg_quality: u8,
    /// Rectangle encoding in responses
    pub rect_encoding: RectEncoding,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            score_threshold: 5.0,
            shape: MarkerShape::Rectangle,
            stroke_width: 2.0,
            color: [255, 255, 0],
            jpeg_quality: 100,
            rect_encoding: RectEncoding::Corners,
        }
    }
}

impl AnnotatorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            score_threshold: env_or("ANNOTATE_SCORE_THRESHOLD", defaults.score_threshold),
            shape: env_or("ANNOTATE_SHAPE", defaults.shape),
            stroke_width: env_or("ANNOTATE_STROKE_WIDTH", defaults.stroke_width),
            color: std::env::var("ANNOTATE_COLOR")
                .ok()
                .and_then(|s| parse_hex_color(&s))
                .unwrap_or(defaults.color),
            jpeg_quality: env_or("ANNOTATE_JPEG_QUALITY", defaults.jpeg_quality).clamp(1, 100),
            rect_encoding: env_or("RECT_ENCODING", defaults.rect_encoding),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.min_size, 20);
        assert_eq!(config.max_size, 2000);
        assert_eq!(config.iou_threshold, 0.18);
    }

    #[test]
    fn test_annotator_defaults() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.score_threshold, 5.0);
        assert_eq!(config.shape, MarkerShape::Rectangle);
        assert_eq!(config.color, [255, 255, 0]);
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFFF00"), Some([255, 255, 0]));
        assert_eq!(parse_hex_color("00ff7f"), Some([0, 255, 127]));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }
}
