//! Document model: seat and section markers, shape overlays, and the
//! per-frame store the engine reads from.
//!
//! The host owns every marker. It hands the engine an immutable snapshot on
//! each render ([`MarkerStore::load`]); the engine never creates or deletes
//! markers itself and reports repositioning/reshaping through actions.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::shape::PlacementShape;

/// Unique identifier for a seat or section.
pub type MarkerId = Uuid;

/// Which collection a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Section,
    Seat,
}

/// Typed handle to a marker in either collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerRef {
    pub kind: MarkerKind,
    pub id: MarkerId,
}

impl MarkerRef {
    #[must_use]
    pub fn seat(id: MarkerId) -> Self {
        Self { kind: MarkerKind::Seat, id }
    }

    #[must_use]
    pub fn section(id: MarkerId) -> Self {
        Self { kind: MarkerKind::Section, id }
    }
}

/// Business fields of a seat. The canvas carries them through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_type: Option<String>,
    /// Any other host fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A placed seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatMarker {
    pub id: MarkerId,
    /// Horizontal position, percent of surface width.
    pub x: f64,
    /// Vertical position, percent of surface height.
    pub y: f64,
    /// Absent means the default circle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<PlacementShape>,
    #[serde(default)]
    pub seat: SeatInfo,
}

/// A placed section: an area when it has a shape, a point anchor otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMarker {
    pub id: MarkerId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<PlacementShape>,
    pub name: String,
}

/// Transient clickable region, e.g. a suggested placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeOverlay {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub shape: PlacementShape,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_selected: bool,
    /// Drawn with the dashed placement-preview outline.
    #[serde(default)]
    pub is_placement: bool,
}

/// Read-only view of a marker regardless of its collection.
#[derive(Debug, Clone, Copy)]
pub struct MarkerView<'a> {
    pub marker: MarkerRef,
    pub position: Point,
    pub shape: Option<&'a PlacementShape>,
    /// Section label, if this is a section.
    pub name: Option<&'a str>,
}

/// Snapshot of the host's marker collections for one frame.
#[derive(Debug, Default)]
pub struct MarkerStore {
    seats: Vec<SeatMarker>,
    sections: Vec<SectionMarker>,
    overlays: Vec<ShapeOverlay>,
    index: HashMap<MarkerRef, usize>,
}

impl MarkerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all markers and overlays with a new snapshot.
    pub fn load(&mut self, seats: Vec<SeatMarker>, sections: Vec<SectionMarker>, overlays: Vec<ShapeOverlay>) {
        self.index.clear();
        for (i, seat) in seats.iter().enumerate() {
            self.index.insert(MarkerRef::seat(seat.id), i);
        }
        for (i, section) in sections.iter().enumerate() {
            self.index.insert(MarkerRef::section(section.id), i);
        }
        self.seats = seats;
        self.sections = sections;
        self.overlays = overlays;
    }

    /// Replace only the overlays, which change far more often than markers.
    pub fn set_overlays(&mut self, overlays: Vec<ShapeOverlay>) {
        self.overlays = overlays;
    }

    #[must_use]
    pub fn get(&self, marker: MarkerRef) -> Option<MarkerView<'_>> {
        let idx = *self.index.get(&marker)?;
        match marker.kind {
            MarkerKind::Seat => self.seats.get(idx).map(seat_view),
            MarkerKind::Section => self.sections.get(idx).map(section_view),
        }
    }

    #[must_use]
    pub fn contains(&self, marker: MarkerRef) -> bool {
        self.index.contains_key(&marker)
    }

    /// All markers in draw order: sections first (beneath), then seats.
    pub fn iter(&self) -> impl Iterator<Item = MarkerView<'_>> {
        self.sections.iter().map(section_view).chain(self.seats.iter().map(seat_view))
    }

    #[must_use]
    pub fn seats(&self) -> &[SeatMarker] {
        &self.seats
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionMarker] {
        &self.sections
    }

    #[must_use]
    pub fn overlays(&self) -> &[ShapeOverlay] {
        &self.overlays
    }

    /// Number of seats plus sections.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.seats.len() + self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marker_count() == 0 && self.overlays.is_empty()
    }
}

fn seat_view(seat: &SeatMarker) -> MarkerView<'_> {
    MarkerView {
        marker: MarkerRef::seat(seat.id),
        position: Point::new(seat.x, seat.y),
        shape: seat.shape.as_ref(),
        name: None,
    }
}

fn section_view(section: &SectionMarker) -> MarkerView<'_> {
    MarkerView {
        marker: MarkerRef::section(section.id),
        position: Point::new(section.x, section.y),
        shape: section.shape.as_ref(),
        name: Some(section.name.as_str()),
    }
}
