//! Placement shapes: the persisted, percentage-based geometry of a marker.
//!
//! All sizes are percentages of the design surface so a stored layout renders
//! the same at any pixel resolution:
//!
//! | Field | Unit |
//! |-------|------|
//! | `radius`, `cornerRadius` | percent of the smaller surface side |
//! | `width` | percent of surface width |
//! | `height` | percent of surface height |
//! | `points[i].x` / `.y` | offset from the marker, percent of width / height |
//!
//! Pixel values are derived on demand against an [`ImageRect`] and never stored.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{DEFAULT_CIRCLE_RADIUS_PCT, MIN_FREEFORM_POINTS, MIN_POLYGON_POINTS};
use crate::error::ShapeError;
use crate::layout::ImageRect;

/// Discriminant of a [`ShapeGeometry`], also used to pick a drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Ellipse,
    Polygon,
    Freeform,
    Sofa,
    Stage,
    Seat,
}

impl ShapeKind {
    /// Wire label, e.g. `"RECTANGLE"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Circle => "CIRCLE",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Polygon => "POLYGON",
            Self::Freeform => "FREEFORM",
            Self::Sofa => "SOFA",
            Self::Stage => "STAGE",
            Self::Seat => "SEAT",
        }
    }
}

/// Type-specific size fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeGeometry {
    Circle {
        radius: f64,
    },
    #[serde(rename_all = "camelCase")]
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        corner_radius: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
    },
    Polygon {
        points: Vec<Point>,
    },
    Freeform {
        points: Vec<Point>,
    },
    Sofa {
        width: f64,
        height: f64,
    },
    Stage {
        width: f64,
        height: f64,
    },
    Seat {
        width: f64,
        height: f64,
    },
}

impl ShapeGeometry {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Ellipse { .. } => ShapeKind::Ellipse,
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Freeform { .. } => ShapeKind::Freeform,
            Self::Sofa { .. } => ShapeKind::Sofa,
            Self::Stage { .. } => ShapeKind::Stage,
            Self::Seat { .. } => ShapeKind::Seat,
        }
    }
}

/// A marker's logical shape as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementShape {
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    /// Clockwise rotation in degrees around the marker position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
}

impl PlacementShape {
    #[must_use]
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self { geometry, rotation: None, fill_color: None, stroke_color: None }
    }

    /// The circle substituted for markers that carry no shape.
    #[must_use]
    pub fn default_circle() -> Self {
        Self::new(ShapeGeometry::Circle { radius: DEFAULT_CIRCLE_RADIUS_PCT })
    }

    /// Parse a shape from stored JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Parse`] if the JSON does not describe a known
    /// shape, or a validation error from [`PlacementShape::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ShapeError> {
        let shape: Self = serde_json::from_str(raw)?;
        shape.validate()?;
        Ok(shape)
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Rotation in degrees, 0 when unset.
    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    /// Reject non-finite or non-positive sizes, polygons under 3 points and freeform paths under 2.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let kind = self.kind().label();
        let check = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ShapeError::InvalidSize { kind, field, value })
            }
        };
        match &self.geometry {
            ShapeGeometry::Circle { radius } => check("radius", *radius)?,
            ShapeGeometry::Rectangle { width, height, corner_radius } => {
                check("width", *width)?;
                check("height", *height)?;
                if !corner_radius.is_finite() || *corner_radius < 0.0 {
                    return Err(ShapeError::InvalidSize { kind, field: "cornerRadius", value: *corner_radius });
                }
            }
            ShapeGeometry::Ellipse { width, height }
            | ShapeGeometry::Sofa { width, height }
            | ShapeGeometry::Stage { width, height }
            | ShapeGeometry::Seat { width, height } => {
                check("width", *width)?;
                check("height", *height)?;
            }
            ShapeGeometry::Polygon { points } | ShapeGeometry::Freeform { points } => {
                let min = if self.kind() == ShapeKind::Freeform { MIN_FREEFORM_POINTS } else { MIN_POLYGON_POINTS };
                if points.len() < min {
                    return Err(ShapeError::TooFewPoints { kind, min, count: points.len() });
                }
                if let Some(bad) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    let value = if bad.x.is_finite() { bad.y } else { bad.x };
                    return Err(ShapeError::InvalidSize { kind, field: "points", value });
                }
            }
        }
        if let Some(rotation) = self.rotation {
            if !rotation.is_finite() {
                return Err(ShapeError::InvalidSize { kind, field: "rotation", value: rotation });
            }
        }
        Ok(())
    }

    /// Half width and half height of the unrotated shape, in layer pixels.
    #[must_use]
    pub fn half_extents_px(&self, image: &ImageRect) -> (f64, f64) {
        match &self.geometry {
            ShapeGeometry::Circle { radius } => {
                let r = pct_of(*radius, image.min_side());
                (r, r)
            }
            ShapeGeometry::Rectangle { width, height, .. }
            | ShapeGeometry::Ellipse { width, height }
            | ShapeGeometry::Sofa { width, height }
            | ShapeGeometry::Stage { width, height }
            | ShapeGeometry::Seat { width, height } => {
                (pct_of(*width, image.width) / 2.0, pct_of(*height, image.height) / 2.0)
            }
            ShapeGeometry::Polygon { points } | ShapeGeometry::Freeform { points } => {
                points_px(points, image).iter().fold((0.0_f64, 0.0_f64), |(hw, hh), p| {
                    (hw.max(p.x.abs()), hh.max(p.y.abs()))
                })
            }
        }
    }

    /// Whether a point in the shape's local frame (layer pixels, relative to
    /// the marker, rotation already removed) lies inside the shape.
    #[must_use]
    pub fn contains_local(&self, local: Point, image: &ImageRect) -> bool {
        match &self.geometry {
            ShapeGeometry::Circle { radius } => {
                let r = pct_of(*radius, image.min_side());
                local.x.hypot(local.y) <= r
            }
            ShapeGeometry::Ellipse { .. } => {
                let (rx, ry) = self.half_extents_px(image);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                (local.x / rx).powi(2) + (local.y / ry).powi(2) <= 1.0
            }
            ShapeGeometry::Rectangle { .. }
            | ShapeGeometry::Sofa { .. }
            | ShapeGeometry::Stage { .. }
            | ShapeGeometry::Seat { .. } => {
                let (hw, hh) = self.half_extents_px(image);
                local.x.abs() <= hw && local.y.abs() <= hh
            }
            ShapeGeometry::Polygon { points } | ShapeGeometry::Freeform { points } => {
                point_in_polygon(local, &points_px(points, image))
            }
        }
    }
}

/// Polygon offsets converted to layer pixels relative to the marker.
#[must_use]
pub fn points_px(points: &[Point], image: &ImageRect) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(pct_of(p.x, image.width), pct_of(p.y, image.height)))
        .collect()
}

fn pct_of(pct: f64, side: f64) -> f64 {
    pct * side / 100.0
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(pt: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > pt.y) != (b.y > pt.y) {
            let x_cross = (b.x - a.x) * (pt.y - a.y) / (b.y - a.y) + a.x;
            if pt.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
