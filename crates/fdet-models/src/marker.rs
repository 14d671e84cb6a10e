//! Annotation marker shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outline drawn around each reported face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    #[default]
    Rectangle,
    Circle,
}

impl MarkerShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerShape::Rectangle => "rectangle",
            MarkerShape::Circle => "circle",
        }
    }
}

impl fmt::Display for MarkerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MarkerShape {
    type Err = MarkerShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rectangle" | "rect" => Ok(MarkerShape::Rectangle),
            "circle" => Ok(MarkerShape::Circle),
            _ => Err(MarkerShapeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown marker shape: {0}")]
pub struct MarkerShapeParseError(String);
