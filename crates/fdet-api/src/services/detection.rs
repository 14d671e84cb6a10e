//! Batch orchestration: store, detect and annotate each upload in turn.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fdet_media::{
    AnnotatorConfig, Annotator, DetectorConfig, FaceDetector, FacePipeline, TempStore,
};
use fdet_models::{AggregateResult, DetectionResult, MarkerShape};
use tracing::{debug, info};

use super::upload::{Upload, UploadBatch};
use crate::error::ApiResult;
use crate::metrics;

/// Per-request processing options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    pub shape: MarkerShape,
    /// Attach the annotated JPEG to each result
    pub include_image: bool,
}

/// Runs uploads through the detect/annotate pipeline.
///
/// Work is blocking and strictly sequential: each image finishes, including
/// removal of its temp files, before the next one starts. The first failing
/// image aborts the batch.
#[derive(Clone)]
pub struct DetectionService {
    store: TempStore,
    pipeline: FacePipeline,
    annotator: Annotator,
}

impl DetectionService {
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        detector_config: &DetectorConfig,
        annotator_config: AnnotatorConfig,
        store: TempStore,
    ) -> Self {
        Self {
            pipeline: FacePipeline::new(detector, detector_config.iou_threshold),
            annotator: Annotator::new(annotator_config, store.clone()),
            store,
        }
    }

    /// Options used when a request does not override them.
    pub fn default_options(&self) -> DetectOptions {
        DetectOptions {
            shape: self.annotator.config().shape,
            include_image: false,
        }
    }

    pub fn temp_store(&self) -> &TempStore {
        &self.store
    }

    /// Process every upload in order and aggregate the results.
    pub fn process_batch(
        &self,
        batch: &UploadBatch,
        options: &DetectOptions,
    ) -> ApiResult<AggregateResult> {
        let begin = Instant::now();
        let mut data = Vec::with_capacity(batch.len());

        for upload in batch.iter() {
            data.push(self.process_image(upload, options)?);
        }

        let result = AggregateResult::success(data, begin.elapsed());
        info!(
            images = result.total_images,
            faces = result.total_faces(),
            total_time = %result.total_time,
            "Batch processed"
        );

        Ok(result)
    }

    /// Store, detect and annotate one upload.
    pub fn process_image(&self, upload: &Upload, options: &DetectOptions) -> ApiResult<DetectionResult> {
        let start = Instant::now();

        let mut stream = upload.open();
        let temp = self.store.persist(&mut stream)?;

        let detected = self.pipeline.detect(temp.path())?;
        let annotation = self
            .annotator
            .annotate(detected.image, &detected.detections, options.shape)?;

        let elapsed = start.elapsed();
        drop(temp);

        metrics::record_image_processed(annotation.faces.len(), elapsed.as_secs_f64());
        info!(
            image = %upload.file_name,
            faces = annotation.faces.len(),
            candidates = detected.detections.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Image processed"
        );

        let result = DetectionResult::new(upload.file_name.clone(), annotation.faces, elapsed);
        if options.include_image {
            debug!(image = %upload.file_name, bytes = annotation.encoded.len(), "Attaching annotated image");
            return Ok(result.with_image_base64(BASE64.encode(&annotation.encoded)));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use fdet_media::{MediaError, MediaResult};
    use fdet_models::Detection;
    use image::{DynamicImage, GrayImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    use crate::error::ApiError;

    struct FixedDetector {
        detections: Vec<Detection>,
        calls: AtomicUsize,
    }

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &GrayImage) -> MediaResult<Vec<Detection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.detections.clone())
        }
    }

    fn png(width: u32, height: u32) -> Bytes {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        Bytes::from(bytes)
    }

    fn service(dir: &TempDir, detections: Vec<Detection>) -> (DetectionService, Arc<FixedDetector>) {
        let detector = Arc::new(FixedDetector {
            detections,
            calls: AtomicUsize::new(0),
        });
        let service = DetectionService::new(
            detector.clone(),
            &DetectorConfig::default(),
            AnnotatorConfig::default(),
            TempStore::new(dir.path()),
        );
        (service, detector)
    }

    fn temp_entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_batch_keeps_upload_order() {
        let dir = TempDir::new().unwrap();
        let (service, detector) = service(&dir, vec![Detection::new(30, 30, 20, 7.0)]);

        let batch: UploadBatch = vec![
            Upload::new("first.png", png(64, 64)),
            Upload::new("second.png", png(64, 64)),
        ]
        .into_iter()
        .collect();

        let result = service.process_batch(&batch, &service.default_options()).unwrap();

        assert_eq!(result.status, "success");
        assert_eq!(result.total_images, 2);
        assert_eq!(result.data[0].image_name, "first.png");
        assert_eq!(result.data[1].image_name, "second.png");
        assert_eq!(result.total_faces(), 2);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 2);
        assert_eq!(temp_entries(&dir), 0);
    }

    #[test]
    fn test_failure_aborts_remaining_images() {
        let dir = TempDir::new().unwrap();
        let (service, detector) = service(&dir, Vec::new());

        let batch: UploadBatch = vec![
            Upload::new("broken.png", Bytes::from_static(b"not an image")),
            Upload::new("fine.png", png(32, 32)),
        ]
        .into_iter()
        .collect();

        let err = service
            .process_batch(&batch, &service.default_options())
            .unwrap_err();

        assert!(matches!(err, ApiError::Detection(MediaError::DecodeFailed(_))));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
        assert_eq!(temp_entries(&dir), 0);
    }

    #[test]
    fn test_include_image_attaches_jpeg() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, Vec::new());

        let options = DetectOptions {
            shape: MarkerShape::Circle,
            include_image: true,
        };
        let result = service
            .process_image(&Upload::new("face.png", png(40, 40)), &options)
            .unwrap();

        let encoded = BASE64.decode(result.image_base64.unwrap()).unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
        assert_eq!(result.total_faces, 0);
    }

    #[test]
    fn test_storage_failure() {
        let dir = TempDir::new().unwrap();
        let detector = Arc::new(FixedDetector {
            detections: Vec::new(),
            calls: AtomicUsize::new(0),
        });
        let service = DetectionService::new(
            detector,
            &DetectorConfig::default(),
            AnnotatorConfig::default(),
            TempStore::new(dir.path().join("missing")),
        );

        let err = service
            .process_image(&Upload::new("a.png", png(8, 8)), &service.default_options())
            .unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }
}
