//! Viewport culling and detail gating for large floor plans.

#[cfg(test)]
#[path = "virtualize_test.rs"]
mod virtualize_test;

use std::collections::HashSet;

use crate::camera::Point;
use crate::config::CanvasConfig;
use crate::doc::{MarkerRef, MarkerStore};
use crate::layout::Projection;
use crate::selection::{PercentRect, SelectionState};

/// What to draw this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    /// Visible markers in draw order.
    pub markers: Vec<MarkerRef>,
    /// Indices into [`MarkerStore::overlays`] of visible overlays.
    pub overlays: Vec<usize>,
    /// Whether hover feedback is animated.
    pub hover_enabled: bool,
    /// Whether markers collapse to plain dots.
    pub low_detail: bool,
    /// Whether anything was culled at all.
    pub culled: bool,
    index: HashSet<MarkerRef>,
}

impl Visibility {
    #[must_use]
    pub fn contains(&self, marker: MarkerRef) -> bool {
        self.index.contains(&marker)
    }

    /// Visible markers plus overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len() + self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The percent-space window covered by the viewport, grown by `padding` (a fraction of its size) on every side.
#[must_use]
pub fn visible_window(projection: &Projection, viewport_w: f64, viewport_h: f64, padding: f64) -> PercentRect {
    let (pad_x, pad_y) = (viewport_w * padding, viewport_h * padding);
    PercentRect::from_corners(
        projection.stage_to_percentage(Point::new(-pad_x, -pad_y)),
        projection.stage_to_percentage(Point::new(viewport_w + pad_x, viewport_h + pad_y)),
    )
}

/// Decide which markers and overlays to draw.
///
/// Small scenes are drawn whole. Larger ones keep only items inside the
/// padded viewport, plus every selected marker.
#[must_use]
pub fn compute_visibility(
    store: &MarkerStore,
    selection: &SelectionState,
    projection: &Projection,
    viewport: (f64, f64),
    config: &CanvasConfig,
) -> Visibility {
    let total = store.marker_count() + store.overlays().len();
    let culled = total > config.virtualize_threshold;
    let window = visible_window(projection, viewport.0, viewport.1, config.viewport_padding);

    let markers: Vec<MarkerRef> = store
        .iter()
        .filter(|view| !culled || selection.contains(view.marker) || window.contains(view.position))
        .map(|view| view.marker)
        .collect();
    let overlays: Vec<usize> = store
        .overlays()
        .iter()
        .enumerate()
        .filter(|(_, o)| !culled || o.is_selected || window.contains(Point::new(o.x, o.y)))
        .map(|(i, _)| i)
        .collect();

    let visible = markers.len() + overlays.len();
    let index = markers.iter().copied().collect();
    Visibility {
        markers,
        overlays,
        hover_enabled: visible <= config.hover_animation_threshold,
        low_detail: projection.zoom() < config.low_detail_zoom,
        culled,
        index,
    }
}
