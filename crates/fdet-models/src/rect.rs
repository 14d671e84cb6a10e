//! Bounding rectangles reported for detected faces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::detection::Detection;

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Face rectangle, serialized as `{"Min": {"X", "Y"}, "Max": {"X", "Y"}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceRect {
    pub min: Point,
    pub max: Point,
}

impl FaceRect {
    /// Build a rectangle from two corners, swapping coordinates so that
    /// `min <= max` on both axes.
    pub fn canonical(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (min_x, max_x) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
        let (min_y, max_y) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Derive the rectangle reported for a detection.
    pub fn from_detection(det: &Detection, encoding: RectEncoding) -> Self {
        let left = det.col - det.scale / 2;
        let top = det.row - det.scale / 2;
        match encoding {
            RectEncoding::Corners => Self::canonical(left, top, left + det.scale, top + det.scale),
            RectEncoding::Legacy => Self::canonical(left, top, det.scale, det.scale),
        }
    }
}

/// How a detection's center/scale is turned into a [`FaceRect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RectEncoding {
    /// Absolute corners of the detection window.
    #[default]
    Corners,
    /// `(left, top, scale, scale)` packed into the corner fields, as the
    /// historic service reported it.
    Legacy,
}

impl RectEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            RectEncoding::Corners => "corners",
            RectEncoding::Legacy => "legacy",
        }
    }
}

impl fmt::Display for RectEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RectEncoding {
    type Err = RectEncodingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corners" => Ok(RectEncoding::Corners),
            "legacy" => Ok(RectEncoding::Legacy),
            _ => Err(RectEncodingParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown rectangle encoding: {0}")]
pub struct RectEncodingParseError(String);
