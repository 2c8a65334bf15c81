//! Per-marker presentation: interaction phase, drag policy, paint style, and
//! the raster cache of marker bitmaps.

#[cfg(test)]
#[path = "marker_test.rs"]
mod marker_test;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::camera::Point;
use crate::consts::{CACHE_POSITION_STEP_PCT, CACHE_SCALE_STEP, PREVIEW_DASH_PX};
use crate::doc::{MarkerKind, MarkerRef, MarkerStore, ShapeOverlay};
use crate::input::{Tool, UiState};
use crate::primitive::ShapeStyle;
use crate::shape::{PlacementShape, ShapeKind};

const SEAT_FILL: &str = "#4A90D9";
const SEAT_STROKE: &str = "#1F3A5F";
const SECTION_FILL: &str = "#B8D4EE";
const SECTION_STROKE: &str = "#4A6A8A";
const SELECTED_STROKE: &str = "#F5A623";
const ANCHOR_STROKE: &str = "#D0021B";
const HOVER_STROKE: &str = "#2D6CB5";
const OVERLAY_FILL: &str = "#9B9B9B";
const OVERLAY_STROKE: &str = "#4A4A4A";

/// Where a marker is in its interaction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPhase {
    Idle,
    Hovered,
    Selected,
    Dragging,
    Transforming,
}

/// The gesture currently moving or reshaping a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveGesture {
    Drag(MarkerRef),
    Transform(MarkerRef),
}

/// Resolve the phase of `marker` for this frame.
#[must_use]
pub fn marker_phase(marker: MarkerRef, ui: &UiState, active: Option<ActiveGesture>) -> MarkerPhase {
    match active {
        Some(ActiveGesture::Drag(m)) if m == marker => return MarkerPhase::Dragging,
        Some(ActiveGesture::Transform(m)) if m == marker => return MarkerPhase::Transforming,
        _ => {}
    }
    if ui.selection.contains(marker) {
        MarkerPhase::Selected
    } else if ui.hovered == Some(marker) {
        MarkerPhase::Hovered
    } else {
        MarkerPhase::Idle
    }
}

/// Inputs to the drag permission rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragContext {
    pub read_only: bool,
    /// The marker is already being dragged.
    pub force_draggable: bool,
    pub tool: Tool,
    pub freeform_in_progress: bool,
    pub placing: bool,
}

impl DragContext {
    #[must_use]
    pub fn from_ui(ui: &UiState, freeform_in_progress: bool) -> Self {
        Self {
            read_only: ui.read_only,
            force_draggable: false,
            tool: ui.tool,
            freeform_in_progress,
            placing: ui.is_placing(),
        }
    }
}

/// Whether a press on a marker may turn into a drag.
///
/// Read-only always forbids. A drag already under way always continues.
/// Shape tools forbid except FREEFORM between paths. Placement modes forbid.
#[must_use]
pub fn can_drag(ctx: &DragContext) -> bool {
    if ctx.read_only {
        return false;
    }
    if ctx.force_draggable {
        return true;
    }
    match ctx.tool {
        Tool::Shape(ShapeKind::Freeform) if ctx.freeform_in_progress => return false,
        Tool::Shape(kind) if kind != ShapeKind::Freeform => return false,
        _ => {}
    }
    !ctx.placing
}

/// The marker showing a transform widget: the single selected marker with a shape.
#[must_use]
pub fn transform_target(ui: &UiState, store: &MarkerStore) -> Option<MarkerRef> {
    if ui.read_only || ui.is_placing() {
        return None;
    }
    let marker = ui.selection.single()?;
    store.get(marker).filter(|view| view.shape.is_some()).map(|view| view.marker)
}

/// Paint style for a marker in `phase`, honouring the shape's own colors.
#[must_use]
pub fn marker_style(
    kind: MarkerKind,
    shape: Option<&PlacementShape>,
    phase: MarkerPhase,
    is_anchor: bool,
    hover_enabled: bool,
) -> ShapeStyle {
    let (fill, stroke, opacity) = match kind {
        MarkerKind::Seat => (SEAT_FILL, SEAT_STROKE, 1.0),
        MarkerKind::Section => (SECTION_FILL, SECTION_STROKE, 0.6),
    };
    let mut style = ShapeStyle {
        fill: shape.and_then(|s| s.fill_color.clone()).unwrap_or_else(|| fill.into()),
        stroke: shape.and_then(|s| s.stroke_color.clone()).unwrap_or_else(|| stroke.into()),
        stroke_width: 1.0,
        opacity,
        dash: None,
    };
    match phase {
        MarkerPhase::Idle => {}
        MarkerPhase::Hovered => {
            if hover_enabled {
                style.stroke = HOVER_STROKE.into();
                style.stroke_width = 2.0;
            }
        }
        MarkerPhase::Selected | MarkerPhase::Transforming => {
            style.stroke = SELECTED_STROKE.into();
            style.stroke_width = 2.0;
        }
        MarkerPhase::Dragging => {
            style.stroke = SELECTED_STROKE.into();
            style.stroke_width = 2.0;
            style.opacity *= 0.7;
        }
    }
    if is_anchor {
        style.stroke = ANCHOR_STROKE.into();
        style.stroke_width = 3.0;
    }
    style
}

/// Paint style for a shape overlay.
#[must_use]
pub fn overlay_style(overlay: &ShapeOverlay, hovered: bool) -> ShapeStyle {
    let mut style = ShapeStyle {
        fill: overlay.shape.fill_color.clone().unwrap_or_else(|| OVERLAY_FILL.into()),
        stroke: overlay.shape.stroke_color.clone().unwrap_or_else(|| OVERLAY_STROKE.into()),
        stroke_width: 1.0,
        opacity: 0.5,
        dash: overlay.is_placement.then_some(PREVIEW_DASH_PX),
    };
    if overlay.is_selected {
        style.stroke = SELECTED_STROKE.into();
        style.stroke_width = 2.0;
        style.opacity = 0.8;
    } else if hovered {
        style.opacity = 0.7;
    }
    style
}

/// Whether a marker's visual may be served from the raster cache.
#[must_use]
pub fn is_cacheable(phase: MarkerPhase, low_detail: bool) -> bool {
    phase == MarkerPhase::Idle && !low_detail
}

/// Identity of a cached bitmap: anything that changes how it looks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    shape: String,
    position: (i64, i64),
    surface: (i64, i64),
    /// Device pixels per layer pixel (zoom times device pixel ratio).
    scale: i64,
    selected: bool,
}

impl CacheKey {
    #[must_use]
    pub fn new(shape: Option<&PlacementShape>, position: Point, surface: (f64, f64), scale: f64, selected: bool) -> Self {
        Self {
            shape: shape.map(|s| serde_json::to_string(s).unwrap_or_default()).unwrap_or_default(),
            position: (quantize(position.x, CACHE_POSITION_STEP_PCT), quantize(position.y, CACHE_POSITION_STEP_PCT)),
            surface: (quantize(surface.0, 1.0), quantize(surface.1, 1.0)),
            scale: quantize(scale, CACHE_SCALE_STEP),
            selected,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(value: f64, step: f64) -> i64 {
    (value / step).round() as i64
}

#[derive(Debug)]
struct Cached<T> {
    key: CacheKey,
    value: T,
}

/// Marker id to its rasterized bitmap, owned by the rendering side.
///
/// An entry is rebuilt only when the marker's [`CacheKey`] changes.
#[derive(Debug)]
pub struct ViewRegistry<T> {
    entries: HashMap<MarkerRef, Cached<T>>,
    builds: usize,
}

impl<T> Default for ViewRegistry<T> {
    fn default() -> Self {
        Self { entries: HashMap::new(), builds: 0 }
    }
}

impl<T> ViewRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `marker`, rebuilt with `build` when `key` changed.
    ///
    /// # Errors
    ///
    /// Propagates the error of `build`; the previous entry is dropped in that case.
    pub fn resolve<E>(&mut self, marker: MarkerRef, key: CacheKey, build: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        match self.entries.entry(marker) {
            Entry::Occupied(mut entry) => {
                if entry.get().key != key {
                    self.builds += 1;
                    match build() {
                        Ok(value) => {
                            entry.insert(Cached { key, value });
                        }
                        Err(err) => {
                            entry.remove();
                            return Err(err);
                        }
                    }
                }
                Ok(&entry.into_mut().value)
            }
            Entry::Vacant(entry) => {
                self.builds += 1;
                let value = build()?;
                Ok(&entry.insert(Cached { key, value }).value)
            }
        }
    }

    /// Drop entries for markers no longer in `store`.
    pub fn prune(&mut self, store: &MarkerStore) {
        self.entries.retain(|marker, _| store.contains(*marker));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries built since creation.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds
    }
}
