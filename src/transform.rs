//! Resize/rotate gestures and the shape-specific rules that fold a finished
//! gesture back into a logical shape.
//!
//! A transform is tracked as a [`GestureState`] in stage pixels while the
//! pointer is down. On release the accumulated scale and rotation are applied
//! to the marker's [`PlacementShape`] with [`apply_transform`], after which the
//! gesture is discarded; the logical shape never stores a visual scale.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::camera::Point;
use crate::consts::{
    MIN_SHAPE_SIZE_PCT, SOFA_MIN_HEIGHT_PCT, SOFA_MIN_WIDTH_PCT, STAGE_MIN_HEIGHT_PCT, STAGE_MIN_WIDTH_PCT,
};
use crate::doc::MarkerRef;
use crate::hit::ResizeAnchor;
use crate::layout::{ImageRect, Projection};
use crate::shape::{PlacementShape, ShapeGeometry};

/// Which part of the transform handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformHandle {
    Resize(ResizeAnchor),
    Rotate,
}

/// Ephemeral pixel-space state of an active resize/rotate.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub marker: MarkerRef,
    pub handle: TransformHandle,
    /// Marker center at gesture start, stage pixels.
    pub origin_center: Point,
    /// Unrotated half extents at gesture start, stage pixels.
    pub half_extents: (f64, f64),
    /// Rotation at gesture start, degrees.
    pub origin_rotation: f64,
    /// Pointer position at gesture start, stage pixels.
    pub start_pointer: Point,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    /// Current marker center, stage pixels. Moves when a resize pins the opposite edge.
    pub center: Point,
}

impl GestureState {
    #[must_use]
    pub fn new(
        marker: MarkerRef,
        handle: TransformHandle,
        center: Point,
        half_extents: (f64, f64),
        rotation: f64,
        pointer: Point,
    ) -> Self {
        Self {
            marker,
            handle,
            origin_center: center,
            half_extents,
            origin_rotation: rotation,
            start_pointer: pointer,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation,
            center,
        }
    }

    /// Update scale/rotation from the current pointer position (stage pixels).
    pub fn update(&mut self, pointer: Point) {
        match self.handle {
            TransformHandle::Rotate => {
                let start = angle_deg(self.origin_center, self.start_pointer);
                let now = angle_deg(self.origin_center, pointer);
                self.rotation = normalize_deg(self.origin_rotation + (now - start));
            }
            TransformHandle::Resize(anchor) => {
                let (ux, uy) = anchor.direction();
                let hw = self.half_extents.0.max(f64::EPSILON);
                let hh = self.half_extents.1.max(f64::EPSILON);
                let local = Point::new(pointer.x - self.origin_center.x, pointer.y - self.origin_center.y)
                    .rotated(-self.origin_rotation);

                // The handle opposite the dragged one stays pinned.
                self.scale_x = if ux == 0.0 { 1.0 } else { (local.x + ux * hw) / (2.0 * ux * hw) };
                self.scale_y = if uy == 0.0 { 1.0 } else { (local.y + uy * hh) / (2.0 * uy * hh) };

                let shift = Point::new(-ux * hw * (1.0 - self.scale_x), -uy * hh * (1.0 - self.scale_y))
                    .rotated(self.origin_rotation);
                self.center = Point::new(self.origin_center.x + shift.x, self.origin_center.y + shift.y);
            }
        }
    }

    /// Whether the gesture changed anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        const EPS: f64 = 1e-9;
        (self.scale_x - 1.0).abs() < EPS
            && (self.scale_y - 1.0).abs() < EPS
            && (self.rotation - self.origin_rotation).abs() < EPS
    }
}

/// Result of a finished transform, ready to hand to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCommit {
    pub marker: MarkerRef,
    pub shape: PlacementShape,
    /// New marker position (percent) when the resize moved the center.
    pub position: Option<Point>,
}

/// Fold a finished gesture into the marker's shape.
///
/// Returns `None` for a gesture that changed nothing.
#[must_use]
pub fn commit_gesture(
    gesture: &GestureState,
    shape: Option<&PlacementShape>,
    projection: &Projection,
) -> Option<TransformCommit> {
    if gesture.is_noop() {
        return None;
    }
    let base = shape.cloned().unwrap_or_else(PlacementShape::default_circle);
    let image = projection.image();
    let shape = apply_transform(&base, gesture.scale_x, gesture.scale_y, gesture.rotation, &image);

    let moved = gesture.center.distance(gesture.origin_center) > 1e-6;
    let position = moved.then(|| projection.stage_to_percentage(gesture.center));
    Some(TransformCommit { marker: gesture.marker, shape, position })
}

/// Apply an accumulated scale and absolute rotation to `shape`.
///
/// | Type | Rule |
/// |------|------|
/// | CIRCLE | radius × max(\|sx\|, \|sy\|) |
/// | RECTANGLE, ELLIPSE, SEAT | width × \|sx\|, height × \|sy\| |
/// | POLYGON, FREEFORM | points × mean(\|sx\|, \|sy\|) |
/// | SOFA, STAGE | both sides × mean(\|sx\|, \|sy\|) |
///
/// Every size is floored at its type's minimum. Rotation is stored as given.
#[must_use]
pub fn apply_transform(
    shape: &PlacementShape,
    scale_x: f64,
    scale_y: f64,
    rotation_deg: f64,
    image: &ImageRect,
) -> PlacementShape {
    let sx = scale_x.abs();
    let sy = scale_y.abs();
    let uniform = (sx + sy) / 2.0;

    let geometry = match &shape.geometry {
        ShapeGeometry::Circle { radius } => {
            ShapeGeometry::Circle { radius: (radius * sx.max(sy)).max(MIN_SHAPE_SIZE_PCT) }
        }
        ShapeGeometry::Rectangle { width, height, corner_radius } => {
            let width = (width * sx).max(MIN_SHAPE_SIZE_PCT);
            let height = (height * sy).max(MIN_SHAPE_SIZE_PCT);
            let corner_radius = corner_radius.min(max_corner_radius_pct(width, height, image));
            ShapeGeometry::Rectangle { width, height, corner_radius }
        }
        ShapeGeometry::Ellipse { width, height } => ShapeGeometry::Ellipse {
            width: (width * sx).max(MIN_SHAPE_SIZE_PCT),
            height: (height * sy).max(MIN_SHAPE_SIZE_PCT),
        },
        ShapeGeometry::Seat { width, height } => ShapeGeometry::Seat {
            width: (width * sx).max(MIN_SHAPE_SIZE_PCT),
            height: (height * sy).max(MIN_SHAPE_SIZE_PCT),
        },
        ShapeGeometry::Polygon { points } => ShapeGeometry::Polygon { points: scale_points(points, uniform) },
        ShapeGeometry::Freeform { points } => ShapeGeometry::Freeform { points: scale_points(points, uniform) },
        ShapeGeometry::Sofa { width, height } => ShapeGeometry::Sofa {
            width: (width * uniform).max(SOFA_MIN_WIDTH_PCT),
            height: (height * uniform).max(SOFA_MIN_HEIGHT_PCT),
        },
        ShapeGeometry::Stage { width, height } => ShapeGeometry::Stage {
            width: (width * uniform).max(STAGE_MIN_WIDTH_PCT),
            height: (height * uniform).max(STAGE_MIN_HEIGHT_PCT),
        },
    };

    PlacementShape {
        geometry,
        rotation: Some(rotation_deg),
        fill_color: shape.fill_color.clone(),
        stroke_color: shape.stroke_color.clone(),
    }
}

// Half the smaller pixel side, expressed in percent of the surface's short side.
fn max_corner_radius_pct(width_pct: f64, height_pct: f64, image: &ImageRect) -> f64 {
    let min_side = image.min_side();
    if min_side <= 0.0 {
        return 0.0;
    }
    let w_px = width_pct * image.width / 100.0;
    let h_px = height_pct * image.height / 100.0;
    w_px.min(h_px) / 2.0 / min_side * 100.0
}

fn scale_points(points: &[Point], factor: f64) -> Vec<Point> {
    points.iter().map(|p| Point::new(p.x * factor, p.y * factor)).collect()
}

fn angle_deg(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}

fn normalize_deg(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Coalesces redraw requests during a gesture to one per animation frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameThrottle {
    pending: bool,
}

impl FrameThrottle {
    /// Ask for a redraw. Returns `true` only for the first request since the last frame.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// The animation frame fired; the next request schedules a new one.
    pub fn frame_done(&mut self) {
        self.pending = false;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
