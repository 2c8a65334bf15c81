//! Hit-testing in stage space against markers, overlays and transform handles.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::{HANDLE_RADIUS_PX, MIN_MARKER_HIT_RADIUS_PX};
use crate::doc::{MarkerRef, MarkerStore, MarkerView};
use crate::layout::Projection;
use crate::shape::PlacementShape;
use crate::transform::TransformHandle;

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All anchors, clockwise from the top edge.
    pub const ALL: [ResizeAnchor; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Unit direction from the box center in the unrotated frame (`y` grows downward).
    #[must_use]
    pub fn direction(self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::Se => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::Sw => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::Nw => (-1.0, -1.0),
        }
    }

    /// CSS cursor for this handle, ignoring rotation.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Se | Self::Nw => "nwse-resize",
        }
    }
}

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A handle of the transform widget attached to `marker`.
    Handle { marker: MarkerRef, handle: TransformHandle },
    /// The body of a seat or section.
    Marker(MarkerRef),
    /// A shape overlay, by id.
    Overlay(String),
}

impl Hit {
    /// Whether drawing gestures must ignore this target.
    #[must_use]
    pub fn blocks_drawing(&self) -> bool {
        matches!(self, Self::Handle { .. } | Self::Marker(_))
    }
}

/// Stage-space box of a marker: center, unrotated half extents, rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageBox {
    pub center: Point,
    pub half_w: f64,
    pub half_h: f64,
    pub rotation: f64,
}

/// Resolve a marker's box in stage pixels.
#[must_use]
pub fn marker_box(position: Point, shape: Option<&PlacementShape>, projection: &Projection) -> StageBox {
    let fallback = PlacementShape::default_circle();
    let shape = shape.unwrap_or(&fallback);
    let (hw, hh) = shape.half_extents_px(&projection.image());
    StageBox {
        center: projection.percentage_to_stage(position),
        half_w: projection.layer_len_to_stage(hw),
        half_h: projection.layer_len_to_stage(hh),
        rotation: shape.rotation_deg(),
    }
}

/// Positions of the eight resize handles in [`ResizeAnchor::ALL`] order.
#[must_use]
pub fn resize_handle_positions(b: &StageBox) -> [Point; 8] {
    ResizeAnchor::ALL.map(|anchor| {
        let (ux, uy) = anchor.direction();
        let offset = Point::new(ux * b.half_w, uy * b.half_h).rotated(b.rotation);
        Point::new(b.center.x + offset.x, b.center.y + offset.y)
    })
}

/// Position of the rotate hotspot, `offset_px` screen pixels above the top edge.
#[must_use]
pub fn rotate_handle_position(b: &StageBox, offset_px: f64) -> Point {
    let offset = Point::new(0.0, -(b.half_h + offset_px)).rotated(b.rotation);
    Point::new(b.center.x + offset.x, b.center.y + offset.y)
}

/// Which transform handle (if any) is under `pointer`. The rotate hotspot wins ties.
#[must_use]
pub fn handle_at(pointer: Point, b: &StageBox, rotate_offset_px: f64) -> Option<TransformHandle> {
    if pointer.distance(rotate_handle_position(b, rotate_offset_px)) <= HANDLE_RADIUS_PX {
        return Some(TransformHandle::Rotate);
    }
    let handles = resize_handle_positions(b);
    ResizeAnchor::ALL
        .iter()
        .zip(handles.iter())
        .find(|(_, pos)| pointer.distance(**pos) <= HANDLE_RADIUS_PX)
        .map(|(anchor, _)| TransformHandle::Resize(*anchor))
}

/// Whether `pointer` (stage pixels) falls on a shape placed at `position`.
#[must_use]
pub fn shape_contains(pointer: Point, position: Point, shape: Option<&PlacementShape>, projection: &Projection) -> bool {
    let center = projection.percentage_to_stage(position);
    if pointer.distance(center) <= MIN_MARKER_HIT_RADIUS_PX {
        return true;
    }
    let fallback = PlacementShape::default_circle();
    let shape = shape.unwrap_or(&fallback);
    let zoom = projection.zoom();
    let local = Point::new((pointer.x - center.x) / zoom, (pointer.y - center.y) / zoom).rotated(-shape.rotation_deg());
    shape.contains_local(local, &projection.image())
}

fn marker_contains(pointer: Point, view: &MarkerView<'_>, projection: &Projection) -> bool {
    shape_contains(pointer, view.position, view.shape, projection)
}

/// Find the top-most target under `pointer`.
///
/// Order: handles of `handle_owner` (the single selected marker showing a
/// transform widget), overlays, seats, then sections.
#[must_use]
pub fn hit_test(
    pointer: Point,
    store: &MarkerStore,
    projection: &Projection,
    handle_owner: Option<MarkerRef>,
    rotate_offset_px: f64,
) -> Option<Hit> {
    if let Some(owner) = handle_owner {
        if let Some(view) = store.get(owner) {
            let b = marker_box(view.position, view.shape, projection);
            if let Some(handle) = handle_at(pointer, &b, rotate_offset_px) {
                return Some(Hit::Handle { marker: owner, handle });
            }
        }
    }

    if let Some(overlay) = store
        .overlays()
        .iter()
        .rev()
        .find(|o| shape_contains(pointer, Point::new(o.x, o.y), Some(&o.shape), projection))
    {
        return Some(Hit::Overlay(overlay.id.clone()));
    }

    let markers: Vec<MarkerView<'_>> = store.iter().collect();
    markers
        .iter()
        .rev()
        .find(|view| marker_contains(pointer, view, projection))
        .map(|view| Hit::Marker(view.marker))
}
