//! Shape creation tools: drag-to-size for box-like shapes and
//! click-to-add-point for freeform paths.
//!
//! All positions are in percent. The session never looks at markers; the
//! engine only feeds it pointer events whose target is empty canvas or an
//! overlay.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use std::f64::consts::TAU;

use crate::camera::Point;
use crate::consts::{
    DRAWN_POLYGON_SIDES, MIN_FREEFORM_POINTS, MIN_SHAPE_SIZE_PCT, SOFA_MIN_HEIGHT_PCT, SOFA_MIN_WIDTH_PCT,
    STAGE_MIN_HEIGHT_PCT, STAGE_MIN_WIDTH_PCT, SURFACE_MAX_PCT,
};
use crate::layout::ImageRect;
use crate::shape::{PlacementShape, ShapeGeometry, ShapeKind};

/// A finished shape ready to be placed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    pub shape: PlacementShape,
    /// Marker position for the new shape, percent.
    pub center: Point,
    /// Dragged box size in percent, absent for freeform paths.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// What to paint for the gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPreview {
    /// Live drag-to-size shape at `center`.
    Sized { shape: PlacementShape, center: Point },
    /// Freeform points placed so far (absolute percent) and the dashed segment to the pointer.
    Path { points: Vec<Point>, cursor: Option<Point> },
}

/// Outcome of a freeform click.
#[derive(Debug, Clone, PartialEq)]
pub enum FreeformStep {
    Added,
    /// Too close to the previous point.
    Ignored,
    Closed(DrawnShape),
}

#[derive(Debug, Clone, Default, PartialEq)]
enum DrawState {
    #[default]
    Idle,
    Sizing {
        kind: ShapeKind,
        start: Point,
        current: Point,
    },
    Freeform {
        points: Vec<Point>,
        cursor: Option<Point>,
    },
}

/// State of the active drawing tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawSession {
    state: DrawState,
}

impl DrawSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any drawing gesture or path is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DrawState::Idle)
    }

    /// Whether a freeform path has at least one point.
    #[must_use]
    pub fn path_in_progress(&self) -> bool {
        matches!(&self.state, DrawState::Freeform { points, .. } if !points.is_empty())
    }

    /// Number of freeform points placed.
    #[must_use]
    pub fn point_count(&self) -> usize {
        match &self.state {
            DrawState::Freeform { points, .. } => points.len(),
            _ => 0,
        }
    }

    /// Start a drag-to-size gesture.
    pub fn begin_sizing(&mut self, kind: ShapeKind, start: Point) {
        self.state = DrawState::Sizing { kind, start, current: start };
    }

    /// Track the pointer: the far corner of a sizing gesture, or the freeform cursor.
    pub fn update(&mut self, pointer: Point) {
        match &mut self.state {
            DrawState::Sizing { current, .. } => *current = pointer,
            DrawState::Freeform { cursor, .. } => *cursor = Some(pointer),
            DrawState::Idle => {}
        }
    }

    /// Finish a drag-to-size gesture.
    ///
    /// Gestures shorter than `min_distance` are discarded.
    pub fn finish_sizing(&mut self, image: &ImageRect, min_distance: f64) -> Option<DrawnShape> {
        let DrawState::Sizing { kind, start, current } = std::mem::take(&mut self.state) else {
            return None;
        };
        if start.distance(current) < min_distance {
            return None;
        }
        let (center, width, height) = box_of(start, current);
        let shape = shape_for_box(kind, width, height, image)?;
        log::debug!("drew {} at ({:.2}, {:.2})", kind.label(), center.x, center.y);
        Some(DrawnShape { shape, center, width: Some(width), height: Some(height) })
    }

    /// Add a freeform point, closing the path when the click lands on the first point.
    pub fn freeform_click(&mut self, point: Point, spacing: f64, close_distance: f64) -> FreeformStep {
        if !matches!(self.state, DrawState::Freeform { .. }) {
            self.state = DrawState::Freeform { points: Vec::new(), cursor: None };
        }
        let DrawState::Freeform { points, cursor } = &mut self.state else {
            return FreeformStep::Ignored;
        };
        *cursor = Some(point);

        if points.len() >= 2 && points[0].distance(point) <= close_distance {
            return self.close_path().map_or(FreeformStep::Ignored, FreeformStep::Closed);
        }
        if points.last().is_some_and(|last| last.distance(point) < spacing) {
            return FreeformStep::Ignored;
        }
        points.push(point);
        FreeformStep::Added
    }

    /// Close the freeform path as is (double-click). A lone point stays open.
    pub fn close_path(&mut self) -> Option<DrawnShape> {
        let DrawState::Freeform { points, .. } = &self.state else {
            return None;
        };
        if points.len() < MIN_FREEFORM_POINTS {
            return None;
        }
        let drawn = freeform_from_points(points);
        self.state = DrawState::Idle;
        log::debug!("closed freeform path at ({:.2}, {:.2})", drawn.center.x, drawn.center.y);
        Some(drawn)
    }

    /// Remove the last freeform point. Returns whether one was removed.
    pub fn undo_point(&mut self) -> bool {
        match &mut self.state {
            DrawState::Freeform { points, .. } => points.pop().is_some(),
            _ => false,
        }
    }

    /// Abandon whatever is in progress. Returns whether anything was.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = DrawState::Idle;
        was_active
    }

    /// Live preview for the renderer.
    #[must_use]
    pub fn preview(&self, image: &ImageRect) -> Option<DrawPreview> {
        match &self.state {
            DrawState::Idle => None,
            DrawState::Sizing { kind, start, current } => {
                let (center, width, height) = box_of(*start, *current);
                let shape = shape_for_box(*kind, width, height, image)?;
                Some(DrawPreview::Sized { shape, center })
            }
            DrawState::Freeform { points, cursor } => {
                Some(DrawPreview::Path { points: points.clone(), cursor: *cursor })
            }
        }
    }
}

fn box_of(a: Point, b: Point) -> (Point, f64, f64) {
    (Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0), (a.x - b.x).abs(), (a.y - b.y).abs())
}

/// Build the shape of `kind` filling a `width` × `height` percent box, with the type floors applied.
///
/// Returns `None` for FREEFORM, which is not drawn by dragging.
#[must_use]
pub fn shape_for_box(kind: ShapeKind, width: f64, height: f64, image: &ImageRect) -> Option<PlacementShape> {
    let w = width.max(MIN_SHAPE_SIZE_PCT);
    let h = height.max(MIN_SHAPE_SIZE_PCT);
    let geometry = match kind {
        ShapeKind::Circle => {
            let min_side = image.min_side();
            if min_side <= 0.0 {
                return None;
            }
            let larger_px = (width * image.width).max(height * image.height) / SURFACE_MAX_PCT;
            let radius = larger_px / 2.0 * SURFACE_MAX_PCT / min_side;
            ShapeGeometry::Circle { radius: radius.max(MIN_SHAPE_SIZE_PCT) }
        }
        ShapeKind::Rectangle => ShapeGeometry::Rectangle { width: w, height: h, corner_radius: 0.0 },
        ShapeKind::Ellipse => ShapeGeometry::Ellipse { width: w, height: h },
        ShapeKind::Seat => ShapeGeometry::Seat { width: w, height: h },
        ShapeKind::Sofa => {
            ShapeGeometry::Sofa { width: width.max(SOFA_MIN_WIDTH_PCT), height: height.max(SOFA_MIN_HEIGHT_PCT) }
        }
        ShapeKind::Stage => {
            ShapeGeometry::Stage { width: width.max(STAGE_MIN_WIDTH_PCT), height: height.max(STAGE_MIN_HEIGHT_PCT) }
        }
        ShapeKind::Polygon => ShapeGeometry::Polygon { points: regular_polygon(DRAWN_POLYGON_SIDES, w / 2.0, h / 2.0) },
        ShapeKind::Freeform => return None,
    };
    Some(PlacementShape::new(geometry))
}

/// Vertices of a regular polygon stretched to radii `rx`, `ry`, first vertex on the positive x axis.
#[must_use]
pub fn regular_polygon(sides: u32, rx: f64, ry: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = TAU * f64::from(i) / f64::from(sides);
            Point::new(rx * angle.cos(), ry * angle.sin())
        })
        .collect()
}

// Re-center absolute points on their vertex mean.
fn freeform_from_points(points: &[Point]) -> DrawnShape {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let center = Point::new(sx / n, sy / n);
    let offsets = points.iter().map(|p| Point::new(p.x - center.x, p.y - center.y)).collect();
    DrawnShape {
        shape: PlacementShape::new(ShapeGeometry::Freeform { points: offsets }),
        center,
        width: None,
        height: None,
    }
}
