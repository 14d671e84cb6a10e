//! Face detection candidates.

use serde::{Deserialize, Serialize};

/// One candidate face.
///
/// The detector describes a face as a square window of side `scale`
/// centered at (`row`, `col`) in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Center row (y) in pixels
    pub row: i32,
    /// Center column (x) in pixels
    pub col: i32,
    /// Window side length in pixels
    pub scale: i32,
    /// Classifier confidence
    pub score: f64,
}

impl Detection {
    /// Create a new detection.
    pub fn new(row: i32, col: i32, scale: i32, score: f64) -> Self {
        Self {
            row,
            col,
            scale,
            score,
        }
    }

    /// Whether the score is strictly greater than `threshold`.
    #[inline]
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.score > threshold
    }

    /// Intersection over union of the two square windows.
    pub fn iou(&self, other: &Detection) -> f64 {
        let (r1, c1, s1) = (self.row as f64, self.col as f64, self.scale as f64);
        let (r2, c2, s2) = (other.row as f64, other.col as f64, other.scale as f64);

        let over_row = ((r1 + s1 / 2.0).min(r2 + s2 / 2.0) - (r1 - s1 / 2.0).max(r2 - s2 / 2.0)).max(0.0);
        let over_col = ((c1 + s1 / 2.0).min(c2 + s2 / 2.0) - (c1 - s1 / 2.0).max(c2 - s2 / 2.0)).max(0.0);

        let intersection = over_row * over_col;
        let union = s1 * s1 + s2 * s2 - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical_windows() {
        let d = Detection::new(50, 50, 20, 1.0);
        assert!((d.iou(&d) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_iou_disjoint_windows() {
        let a = Detection::new(10, 10, 10, 1.0);
        let b = Detection::new(100, 100, 10, 1.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_shifted() {
        // Shifted by half a window along one axis: overlap 10x20 = 200,
        // union 400 + 400 - 200 = 600.
        let a = Detection::new(50, 50, 20, 1.0);
        let b = Detection::new(50, 60, 20, 1.0);
        assert!((a.iou(&b) - 200.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_exceeds_is_strict() {
        let d = Detection::new(0, 0, 10, 5.0);
        assert!(!d.exceeds(5.0));
        assert!(d.exceeds(4.99));
    }
}
