//! Face annotation.
//!
//! Marks every detection above the score threshold on a canvas owned by the
//! current call, computes the reported rectangles and produces the JPEG of
//! the marked image.

use std::io::{BufWriter, Write};

use fdet_models::{Detection, FaceRect, MarkerShape};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use tracing::debug;

use crate::config::AnnotatorConfig;
use crate::error::{MediaError, MediaResult};
use crate::temp_store::TempStore;

/// Rectangles and encoded image produced for one input image.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub faces: Vec<FaceRect>,
    /// JPEG bytes of the marked image
    pub encoded: Vec<u8>,
}

/// Draws face markers and encodes the result.
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotatorConfig,
    store: TempStore,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig, store: TempStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Mark the reported faces and encode the marked image.
    ///
    /// The image is consumed and becomes this call's drawing surface.
    pub fn annotate(
        &self,
        image: DynamicImage,
        detections: &[Detection],
        shape: MarkerShape,
    ) -> MediaResult<Annotation> {
        let mut canvas = image.into_rgb8();
        let faces = self.mark_faces(&mut canvas, detections, shape);
        let encoded = self.encode(&canvas)?;

        debug!(
            faces = faces.len(),
            candidates = detections.len(),
            bytes = encoded.len(),
            %shape,
            "Annotated image"
        );

        Ok(Annotation { faces, encoded })
    }

    /// Draw a marker for each detection scoring strictly above the
    /// threshold and return their rectangles in detection order.
    pub fn mark_faces(
        &self,
        canvas: &mut RgbImage,
        detections: &[Detection],
        shape: MarkerShape,
    ) -> Vec<FaceRect> {
        let color = Rgb(self.config.color);
        let stroke = stroke_px(self.config.stroke_width);

        detections
            .iter()
            .filter(|det| det.exceeds(self.config.score_threshold))
            .map(|det| {
                match shape {
                    MarkerShape::Rectangle => draw_square(canvas, det, stroke, color),
                    MarkerShape::Circle => draw_ring(canvas, det, stroke, color),
                }
                FaceRect::from_detection(det, self.config.rect_encoding)
            })
            .collect()
    }

    /// Encode to a scratch file and read it back; the file is removed when
    /// this returns.
    fn encode(&self, canvas: &RgbImage) -> MediaResult<Vec<u8>> {
        let mut file = self.store.scratch("annotated", ".jpg")?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            JpegEncoder::new_with_quality(&mut writer, self.config.jpeg_quality)
                .encode(canvas.as_raw(), canvas.width(), canvas.height(), ColorType::Rgb8)
                .map_err(|e| MediaError::encode_failed(e.to_string()))?;
            writer
                .flush()
                .map_err(|e| MediaError::temp_file_write(e.to_string()))?;
        }

        std::fs::read(file.path()).map_err(|e| MediaError::temp_file_read(e.to_string()))
    }
}

fn stroke_px(width: f32) -> i32 {
    (width.round() as i32).max(1)
}

/// Offsets of the concentric outlines making up a stroke, centered on the
/// nominal path: width 2 gives `[-1, 0]`.
fn stroke_insets(stroke: i32) -> std::ops::Range<i32> {
    -(stroke / 2)..(stroke - stroke / 2)
}

fn draw_square(canvas: &mut RgbImage, det: &Detection, stroke: i32, color: Rgb<u8>) {
    let left = det.col - det.scale / 2;
    let top = det.row - det.scale / 2;

    for inset in stroke_insets(stroke) {
        let side = det.scale - 2 * inset;
        if side <= 0 {
            continue;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(side as u32, side as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_ring(canvas: &mut RgbImage, det: &Detection, stroke: i32, color: Rgb<u8>) {
    let radius = det.scale / 2;

    for inset in stroke_insets(stroke) {
        let r = radius - inset;
        if r <= 0 {
            continue;
        }
        draw_hollow_circle_mut(canvas, (det.col, det.row), r, color);
    }
}
