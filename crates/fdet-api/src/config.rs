//! Function configuration.

use std::path::PathBuf;

use fdet_media::{AnnotatorConfig, DetectorConfig};

/// Default max request body size (128 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 128 * 1024 * 1024;

/// HTTP function configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Directory for per-image temporary files
    pub temp_dir: PathBuf,
    /// Cascade detector settings
    pub detector: DetectorConfig,
    /// Annotation settings
    pub annotator: AnnotatorConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            environment: "development".to_string(),
            metrics_enabled: true,
            temp_dir: std::env::temp_dir(),
            detector: DetectorConfig::default(),
            annotator: AnnotatorConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            detector: DetectorConfig::from_env(),
            annotator: AnnotatorConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }
}

/// Whether an `ENVIRONMENT` value names production, ignoring case.
pub fn is_production_environment(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_body_limit() {
        assert_eq!(ApiConfig::default().max_body_size, 128 << 20);
    }

    #[test]
    fn test_is_production() {
        let config = ApiConfig {
            environment: "Production".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.is_production());
        assert!(!ApiConfig::default().is_production());
    }

    #[test]
    fn test_production_environment_ignores_case() {
        assert!(is_production_environment("production"));
        assert!(is_production_environment("PRODUCTION"));
        assert!(!is_production_environment("staging"));
        assert!(!is_production_environment(""));
    }
}
