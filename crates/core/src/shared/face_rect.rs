use serde::{Deserialize, Serialize};

use crate::shared::detection::Detection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Public face rectangle, serialized as `{"Min":{"X","Y"},"Max":{"X","Y"}}`.
///
/// `max` does not hold the bottom-right corner: it holds `(scale, scale)`.
/// Consumers of the existing response format read it as width/height, so the
/// convention is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceRect {
    pub min: Point,
    pub max: Point,
}

impl FaceRect {
    pub fn from_detection(d: &Detection) -> Self {
        let half = d.scale / 2;
        Self {
            min: Point {
                x: d.col - half,
                y: d.row - half,
            },
            max: Point {
                x: d.scale,
                y: d.scale,
            },
        }
    }
}
