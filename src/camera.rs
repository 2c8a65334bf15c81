//! Pan/zoom camera for the designer layer.
//!
//! The zoomable layer is positioned at `center + pan` with its offset at
//! `center`, so zoom scales around the middle of the viewport:
//!
//! ```text
//! stage = (layer - center) * zoom + center + pan
//! ```

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in percentage, stage, or layer space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Both coordinates clamped to `[0, max]`.
    #[must_use]
    pub fn clamped(self, max: f64) -> Self {
        Self { x: self.x.clamp(0.0, max), y: self.y.clamp(0.0, max) }
    }

    /// Rotate around the origin by `degrees` (clockwise in screen space).
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { x: self.x * cos - self.y * sin, y: self.x * sin + self.y * cos }
    }
}

/// Camera state owned by the host.
///
/// `pan_x` / `pan_y` are in stage pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Zoom, falling back to 1.0 when the host passes a non-positive value.
    #[must_use]
    pub fn effective_zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.0 { self.zoom } else { 1.0 }
    }

    /// Convert a layer-space point to stage pixels.
    #[must_use]
    pub fn layer_to_stage(&self, layer: Point, center: Point) -> Point {
        let zoom = self.effective_zoom();
        Point {
            x: (layer.x - center.x) * zoom + center.x + self.pan_x,
            y: (layer.y - center.y) * zoom + center.y + self.pan_y,
        }
    }

    /// Convert a stage-space point to layer coordinates.
    #[must_use]
    pub fn stage_to_layer(&self, stage: Point, center: Point) -> Point {
        let zoom = self.effective_zoom();
        Point {
            x: (stage.x - center.x - self.pan_x) / zoom + center.x,
            y: (stage.y - center.y - self.pan_y) / zoom + center.y,
        }
    }

    /// Convert a stage-space distance (pixels) to a layer-space distance.
    #[must_use]
    pub fn stage_dist_to_layer(&self, stage_dist: f64) -> f64 {
        stage_dist / self.effective_zoom()
    }
}
