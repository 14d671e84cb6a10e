//! Prometheus metrics for the function.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "fdet_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "fdet_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "fdet_http_requests_in_flight";

    // Processing metrics
    pub const IMAGES_PROCESSED_TOTAL: &str = "fdet_images_processed_total";
    pub const FACES_DETECTED_TOTAL: &str = "fdet_faces_detected_total";
    pub const IMAGE_DURATION_SECONDS: &str = "fdet_image_duration_seconds";
    pub const REQUEST_FAILURES_TOTAL: &str = "fdet_request_failures_total";
}

/// Routes served by the function; anything else is reported as unmatched.
const KNOWN_PATHS: &[&str] = &["/", "/detect", "/health", "/healthz", "/ready", "/metrics"];

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one image that went through the whole pipeline.
pub fn record_image_processed(faces: usize, duration_secs: f64) {
    counter!(names::IMAGES_PROCESSED_TOTAL).increment(1);
    counter!(names::FACES_DETECTED_TOTAL).increment(faces as u64);
    histogram!(names::IMAGE_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed request by error kind.
pub fn record_request_failure(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::REQUEST_FAILURES_TOTAL, &labels).increment(1);
}

/// Collapse unknown paths into one label value.
fn sanitize_path(path: &str) -> String {
    if KNOWN_PATHS.contains(&path) {
        path.to_string()
    } else {
        ":unmatched".to_string()
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/detect"), "/detect");
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/wp-admin/login.php"), ":unmatched");
    }
}
