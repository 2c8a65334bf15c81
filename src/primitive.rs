//! Shape renderer: resolves a percentage-based shape into pixel primitives.
//!
//! This is a pure function of the shape, its style and the surface size; it
//! knows nothing about the browser. [`crate::render`] paints the resulting
//! [`ShapeVisual`] onto a 2D context.

#[cfg(test)]
#[path = "primitive_test.rs"]
mod primitive_test;

use crate::camera::Point;
use crate::consts::LOW_DETAIL_DOT_RADIUS_PX;
use crate::layout::ImageRect;
use crate::shape::{PlacementShape, ShapeGeometry, points_px};

/// Colors and outline for one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Dash pattern (on, off) in screen pixels; `None` draws a solid outline.
    pub dash: Option<[f64; 2]>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self { fill: "#4A90D9".into(), stroke: "#1F3A5F".into(), stroke_width: 1.0, opacity: 1.0, dash: None }
    }
}

/// A single drawable element in the shape's local frame (layer pixels,
/// origin at the marker position, before rotation).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64, corner_radius: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Path { points: Vec<Point>, closed: bool },
    Text { x: f64, y: f64, text: String, size: f64 },
}

/// How a primitive is filled and outlined.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub dash: Option<[f64; 2]>,
}

/// A primitive plus its paint.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub primitive: Primitive,
    pub paint: Paint,
}

/// Everything needed to draw one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeVisual {
    /// Rotation applied around the origin, in degrees.
    pub rotation_deg: f64,
    pub opacity: f64,
    pub items: Vec<DrawItem>,
}

impl ShapeVisual {
    /// Radius around the origin that encloses every item under any rotation,
    /// including half of the widest outline (outlines are `stroke_width / zoom` wide).
    #[must_use]
    pub fn bounding_radius(&self, zoom: f64) -> f64 {
        let zoom = zoom.max(f64::EPSILON);
        self.items
            .iter()
            .map(|item| item.primitive.reach() + item.paint.stroke.as_ref().map_or(0.0, |_| item.paint.stroke_width / zoom / 2.0))
            .fold(0.0, f64::max)
    }
}

impl Primitive {
    /// Farthest distance from the origin this primitive covers.
    fn reach(&self) -> f64 {
        match self {
            Self::Circle { cx, cy, r } => cx.hypot(*cy) + r,
            Self::Ellipse { cx, cy, rx, ry } => cx.hypot(*cy) + rx.max(*ry),
            Self::Rect { x, y, width, height, .. } => {
                let far_x = x.abs().max((x + width).abs());
                let far_y = y.abs().max((y + height).abs());
                far_x.hypot(far_y)
            }
            Self::Path { points, .. } => points.iter().map(|p| p.x.hypot(p.y)).fold(0.0, f64::max),
            // Text is centered on (x, y); 1.5 × size covers a short label either side.
            Self::Text { x, y, size, .. } => x.hypot(*y) + size * 1.5,
        }
    }
}

/// Resolve `shape` against a surface of `image_w` × `image_h` pixels.
///
/// A missing shape draws the default circle. When `parent_rotation` is set
/// the enclosing group already rotates, so the shape's own rotation is not
/// applied again.
#[must_use]
pub fn render_shape(
    shape: Option<&PlacementShape>,
    style: &ShapeStyle,
    image_w: f64,
    image_h: f64,
    parent_rotation: Option<f64>,
) -> ShapeVisual {
    let fallback = PlacementShape::default_circle();
    let shape = shape.unwrap_or(&fallback);
    let image = ImageRect { x: 0.0, y: 0.0, width: image_w, height: image_h };
    let (hw, hh) = shape.half_extents_px(&image);
    let body = body_paint(style);

    let items = match &shape.geometry {
        ShapeGeometry::Circle { .. } => vec![DrawItem { primitive: Primitive::Circle { cx: 0.0, cy: 0.0, r: hw }, paint: body }],
        ShapeGeometry::Rectangle { corner_radius, .. } => {
            let r = (corner_radius * image.min_side() / 100.0).clamp(0.0, hw.min(hh));
            vec![DrawItem { primitive: centered_rect(hw, hh, r), paint: body }]
        }
        ShapeGeometry::Seat { .. } => {
            let r = hw.min(hh) * 0.25;
            vec![DrawItem { primitive: centered_rect(hw, hh, r), paint: body }]
        }
        ShapeGeometry::Ellipse { .. } => {
            vec![DrawItem { primitive: Primitive::Ellipse { cx: 0.0, cy: 0.0, rx: hw, ry: hh }, paint: body }]
        }
        ShapeGeometry::Polygon { points } | ShapeGeometry::Freeform { points } => {
            vec![DrawItem { primitive: Primitive::Path { points: points_px(points, &image), closed: true }, paint: body }]
        }
        ShapeGeometry::Sofa { .. } => sofa_items(hw, hh, &body),
        ShapeGeometry::Stage { .. } => stage_items(hw, hh, &body),
    };

    let rotation_deg = if parent_rotation.is_some() { 0.0 } else { shape.rotation_deg() };
    ShapeVisual { rotation_deg, opacity: style.opacity, items }
}

/// A plain dot for low-detail mode; `zoom` keeps it a constant screen size.
#[must_use]
pub fn render_dot(style: &ShapeStyle, zoom: f64) -> ShapeVisual {
    let r = LOW_DETAIL_DOT_RADIUS_PX / zoom.max(f64::EPSILON);
    ShapeVisual {
        rotation_deg: 0.0,
        opacity: style.opacity,
        items: vec![DrawItem {
            primitive: Primitive::Circle { cx: 0.0, cy: 0.0, r },
            paint: Paint { fill: Some(style.fill.clone()), stroke: None, stroke_width: 0.0, dash: None },
        }],
    }
}

fn body_paint(style: &ShapeStyle) -> Paint {
    Paint {
        fill: Some(style.fill.clone()),
        stroke: Some(style.stroke.clone()),
        stroke_width: style.stroke_width,
        dash: style.dash,
    }
}

fn centered_rect(hw: f64, hh: f64, corner_radius: f64) -> Primitive {
    Primitive::Rect { x: -hw, y: -hh, width: hw * 2.0, height: hh * 2.0, corner_radius }
}

// Backrest across the top, two arms down the sides, cushion between them.
fn sofa_items(hw: f64, hh: f64, body: &Paint) -> Vec<DrawItem> {
    let w = hw * 2.0;
    let h = hh * 2.0;
    let back_h = h * 0.35;
    let arm_w = w * 0.15;
    let lower_h = h - back_h;
    let round = w.min(h) * 0.08;

    let back = Primitive::Rect { x: -hw, y: -hh, width: w, height: back_h, corner_radius: round };
    let left_arm = Primitive::Rect { x: -hw, y: -hh + back_h, width: arm_w, height: lower_h, corner_radius: round };
    let right_arm =
        Primitive::Rect { x: hw - arm_w, y: -hh + back_h, width: arm_w, height: lower_h, corner_radius: round };
    let cushion = Primitive::Rect { x: -hw + arm_w, y: -hh + back_h, width: w - arm_w * 2.0, height: lower_h, corner_radius: 0.0 };

    [back, left_arm, right_arm, cushion]
        .into_iter()
        .map(|primitive| DrawItem { primitive, paint: body.clone() })
        .collect()
}

// Platform, darker apron along the audience edge, centered label.
fn stage_items(hw: f64, hh: f64, body: &Paint) -> Vec<DrawItem> {
    let w = hw * 2.0;
    let h = hh * 2.0;
    let apron_h = h * 0.2;
    let label_size = (h * 0.3).min(w * 0.12).max(1.0);

    let platform = DrawItem { primitive: Primitive::Rect { x: -hw, y: -hh, width: w, height: h, corner_radius: 0.0 }, paint: body.clone() };
    let apron = DrawItem {
        primitive: Primitive::Rect { x: -hw, y: hh - apron_h, width: w, height: apron_h, corner_radius: 0.0 },
        paint: Paint { fill: body.stroke.clone(), stroke: None, stroke_width: 0.0, dash: None },
    };
    let label = DrawItem {
        primitive: Primitive::Text { x: 0.0, y: -apron_h / 2.0, text: "STAGE".into(), size: label_size },
        paint: Paint { fill: body.stroke.clone(), stroke: None, stroke_width: 0.0, dash: None },
    };
    vec![platform, apron, label]
}
