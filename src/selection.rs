//! Selection bookkeeping: the host's selection snapshot, marquee hit
//! testing, and batch-drag delta propagation.
//!
//! The engine never mutates selection itself. Clicks and marquee results are
//! reported to the host, which decides how to change its own selection and
//! passes the new [`SelectionState`] back down on the next render.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::config::BatchClamp;
use crate::consts::SURFACE_MAX_PCT;
use crate::doc::{MarkerId, MarkerKind, MarkerRef, MarkerStore};
use crate::layout::Projection;

/// Selected seats and sections plus the alignment anchors, as owned by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionState {
    pub seats: HashSet<MarkerId>,
    pub sections: HashSet<MarkerId>,
    pub anchor_seat: Option<MarkerId>,
    pub anchor_section: Option<MarkerId>,
}

impl SelectionState {
    #[must_use]
    pub fn contains(&self, marker: MarkerRef) -> bool {
        match marker.kind {
            MarkerKind::Seat => self.seats.contains(&marker.id),
            MarkerKind::Section => self.sections.contains(&marker.id),
        }
    }

    /// Total selected seats and sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len() + self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every selected marker, in a stable order.
    #[must_use]
    pub fn members(&self) -> Vec<MarkerRef> {
        let mut out: Vec<MarkerRef> = self
            .sections
            .iter()
            .map(|id| MarkerRef::section(*id))
            .chain(self.seats.iter().map(|id| MarkerRef::seat(*id)))
            .collect();
        out.sort();
        out
    }

    /// Whether `marker` is the distinguished anchor of a multi-selection.
    #[must_use]
    pub fn is_anchor(&self, marker: MarkerRef) -> bool {
        if self.len() < 2 {
            return false;
        }
        match marker.kind {
            MarkerKind::Seat => self.anchor_seat == Some(marker.id),
            MarkerKind::Section => self.anchor_section == Some(marker.id),
        }
    }

    /// The single selected marker, if exactly one is selected.
    #[must_use]
    pub fn single(&self) -> Option<MarkerRef> {
        if self.len() != 1 {
            return None;
        }
        self.members().into_iter().next()
    }
}

/// Ids captured by a marquee, split by collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeResult {
    pub seat_ids: Vec<MarkerId>,
    pub section_ids: Vec<MarkerId>,
}

/// Normalized rectangle in percent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PercentRect {
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { min_x: a.x.min(b.x), min_y: a.y.min(b.y), max_x: a.x.max(b.x), max_y: a.y.max(b.y) }
    }

    /// Inclusive containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether the rectangle misses the design surface entirely.
    #[must_use]
    pub fn outside_surface(&self) -> bool {
        self.max_x < 0.0 || self.max_y < 0.0 || self.min_x > SURFACE_MAX_PCT || self.min_y > SURFACE_MAX_PCT
    }

    /// The rectangle clamped to the design surface.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let lo = Point::new(self.min_x, self.min_y).clamped(SURFACE_MAX_PCT);
        let hi = Point::new(self.max_x, self.max_y).clamped(SURFACE_MAX_PCT);
        Self { min_x: lo.x, min_y: lo.y, max_x: hi.x, max_y: hi.y }
    }
}

/// Collect markers whose position falls inside the marquee spanned by two stage-space corners.
#[must_use]
pub fn marquee_select(a: Point, b: Point, projection: &Projection, store: &MarkerStore) -> MarqueeResult {
    let rect = PercentRect::from_corners(projection.stage_to_percentage(a), projection.stage_to_percentage(b));
    select_in_rect(&rect, store)
}

/// Collect markers whose position falls inside `rect` (percent space).
#[must_use]
pub fn select_in_rect(rect: &PercentRect, store: &MarkerStore) -> MarqueeResult {
    if rect.outside_surface() {
        return MarqueeResult::default();
    }
    let rect = rect.clamped();
    MarqueeResult {
        seat_ids: store.seats().iter().filter(|s| rect.contains(Point::new(s.x, s.y))).map(|s| s.id).collect(),
        section_ids: store
            .sections()
            .iter()
            .filter(|s| rect.contains(Point::new(s.x, s.y)))
            .map(|s| s.id)
            .collect(),
    }
}

/// Positions of every selected marker at the start of a batch drag.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDrag {
    pub leader: MarkerRef,
    /// Start position of every member, leader included.
    pub snapshot: Vec<(MarkerRef, Point)>,
}

impl BatchDrag {
    /// Snapshot the selection if `leader` belongs to a multi-selection.
    #[must_use]
    pub fn start(leader: MarkerRef, selection: &SelectionState, store: &MarkerStore) -> Option<Self> {
        if selection.len() < 2 || !selection.contains(leader) {
            return None;
        }
        let snapshot: Vec<(MarkerRef, Point)> = selection
            .members()
            .into_iter()
            .filter_map(|m| store.get(m).map(|view| (m, view.position)))
            .collect();
        if snapshot.len() < 2 || !snapshot.iter().any(|(m, _)| *m == leader) {
            return None;
        }
        Some(Self { leader, snapshot })
    }

    /// Leader movement since the snapshot.
    #[must_use]
    pub fn delta(&self, leader_live: Point) -> Point {
        let origin = self
            .snapshot
            .iter()
            .find(|(m, _)| *m == self.leader)
            .map_or(leader_live, |(_, p)| *p);
        Point::new(leader_live.x - origin.x, leader_live.y - origin.y)
    }

    /// Every member's position after moving by `delta`, clamped per `mode`.
    #[must_use]
    pub fn positions(&self, delta: Point, mode: BatchClamp) -> Vec<(MarkerRef, Point)> {
        let delta = match mode {
            BatchClamp::PerMember => delta,
            BatchClamp::Rigid => self.rigid_delta(delta),
        };
        self.snapshot
            .iter()
            .map(|(m, p)| (*m, Point::new(p.x + delta.x, p.y + delta.y).clamped(SURFACE_MAX_PCT)))
            .collect()
    }

    /// Display positions of the members other than the leader.
    #[must_use]
    pub fn follower_positions(&self, delta: Point, mode: BatchClamp) -> Vec<(MarkerRef, Point)> {
        self.positions(delta, mode).into_iter().filter(|(m, _)| *m != self.leader).collect()
    }

    // Largest delta (per axis) that keeps the whole group on the surface.
    fn rigid_delta(&self, delta: Point) -> Point {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (_, p) in &self.snapshot {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Point::new(
            delta.x.clamp((-min_x).min(0.0), (SURFACE_MAX_PCT - max_x).max(0.0)),
            delta.y.clamp((-min_y).min(0.0), (SURFACE_MAX_PCT - max_y).max(0.0)),
        )
    }
}
