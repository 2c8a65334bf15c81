#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::camera::Camera;
use crate::doc::{SeatInfo, SeatMarker, SectionMarker};
use crate::layout::fit_contain;

fn projection() -> Projection {
    Projection::new(fit_contain(1000.0, 1000.0, 1.0), Camera::default(), 1000.0, 1000.0).unwrap()
}

fn seat(x: f64, y: f64) -> SeatMarker {
    SeatMarker { id: Uuid::new_v4(), x, y, shape: None, seat: SeatInfo::default() }
}

fn section(x: f64, y: f64) -> SectionMarker {
    SectionMarker { id: Uuid::new_v4(), x, y, shape: None, name: "A".into() }
}

fn selected(refs: &[MarkerRef]) -> SelectionState {
    let mut sel = SelectionState::default();
    for r in refs {
        match r.kind {
            MarkerKind::Seat => sel.seats.insert(r.id),
            MarkerKind::Section => sel.sections.insert(r.id),
        };
    }
    sel
}

// =============================================================
// SelectionState
// =============================================================

#[test]
fn contains_distinguishes_collections() {
    let id = Uuid::new_v4();
    let sel = selected(&[MarkerRef::seat(id)]);
    assert!(sel.contains(MarkerRef::seat(id)));
    assert!(!sel.contains(MarkerRef::section(id)));
    assert_eq!(sel.single(), Some(MarkerRef::seat(id)));
}

#[test]
fn anchor_only_counts_in_multi_selection() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut sel = selected(&[MarkerRef::seat(a)]);
    sel.anchor_seat = Some(a);
    assert!(!sel.is_anchor(MarkerRef::seat(a)));

    sel.seats.insert(b);
    assert!(sel.is_anchor(MarkerRef::seat(a)));
    assert!(!sel.is_anchor(MarkerRef::seat(b)));
    assert_eq!(sel.single(), None);
}

#[test]
fn selection_deserializes_from_host_json() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"seats":["{id}"],"anchorSeat":"{id}"}}"#);
    let sel: SelectionState = serde_json::from_str(&json).unwrap();
    assert_eq!(sel.len(), 1);
    assert_eq!(sel.anchor_seat, Some(id));
    assert!(sel.sections.is_empty());
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn marquee_collects_both_collections() {
    let mut store = MarkerStore::new();
    let inside_seat = seat(20.0, 20.0);
    let outside_seat = seat(80.0, 80.0);
    let inside_section = section(30.0, 25.0);
    let (seat_id, section_id) = (inside_seat.id, inside_section.id);
    store.load(vec![inside_seat, outside_seat], vec![inside_section], vec![]);

    let result = marquee_select(Point::new(100.0, 100.0), Point::new(400.0, 400.0), &projection(), &store);
    assert_eq!(result.seat_ids, vec![seat_id]);
    assert_eq!(result.section_ids, vec![section_id]);
}

#[test]
fn marquee_corners_may_be_reversed() {
    let mut store = MarkerStore::new();
    let s = seat(50.0, 50.0);
    let id = s.id;
    store.load(vec![s], vec![], vec![]);
    let result = marquee_select(Point::new(600.0, 600.0), Point::new(400.0, 400.0), &projection(), &store);
    assert_eq!(result.seat_ids, vec![id]);
}

#[test]
fn marquee_bounds_are_inclusive() {
    let mut store = MarkerStore::new();
    let s = seat(40.0, 40.0);
    let id = s.id;
    store.load(vec![s], vec![], vec![]);
    let rect = PercentRect { min_x: 40.0, min_y: 40.0, max_x: 60.0, max_y: 60.0 };
    assert_eq!(select_in_rect(&rect, &store).seat_ids, vec![id]);
}

#[test]
fn marquee_fully_outside_surface_is_empty() {
    let mut store = MarkerStore::new();
    store.load(vec![seat(0.0, 0.0), seat(100.0, 100.0)], vec![], vec![]);
    let rect = PercentRect { min_x: -30.0, min_y: -30.0, max_x: -1.0, max_y: -1.0 };
    assert_eq!(select_in_rect(&rect, &store), MarqueeResult::default());
}

#[test]
fn marquee_partly_outside_is_clamped() {
    let mut store = MarkerStore::new();
    let edge = seat(0.0, 10.0);
    let id = edge.id;
    store.load(vec![edge], vec![], vec![]);
    let rect = PercentRect { min_x: -20.0, min_y: 5.0, max_x: 5.0, max_y: 15.0 };
    assert_eq!(select_in_rect(&rect, &store).seat_ids, vec![id]);
}

// =============================================================
// BatchDrag
// =============================================================

fn batch_store() -> (MarkerStore, MarkerRef, MarkerRef, MarkerRef) {
    let mut store = MarkerStore::new();
    let a = seat(10.0, 10.0);
    let b = seat(20.0, 10.0);
    let c = section(95.0, 50.0);
    let refs = (MarkerRef::seat(a.id), MarkerRef::seat(b.id), MarkerRef::section(c.id));
    store.load(vec![a, b], vec![c], vec![]);
    (store, refs.0, refs.1, refs.2)
}

#[test]
fn batch_needs_multi_selection_containing_leader() {
    let (store, a, b, c) = batch_store();
    assert!(BatchDrag::start(a, &selected(&[a]), &store).is_none());
    assert!(BatchDrag::start(c, &selected(&[a, b]), &store).is_none());
    assert!(BatchDrag::start(a, &selected(&[a, b]), &store).is_some());
}

#[test]
fn batch_applies_leader_delta_to_followers() {
    let (store, a, b, _) = batch_store();
    let batch = BatchDrag::start(a, &selected(&[a, b]), &store).unwrap();
    let delta = batch.delta(Point::new(15.0, 12.0));
    assert_eq!(delta, Point::new(5.0, 2.0));
    assert_eq!(batch.follower_positions(delta, BatchClamp::PerMember), vec![(b, Point::new(25.0, 12.0))]);
}

#[test]
fn batch_per_member_clamp_squashes_at_edge() {
    let (store, a, _, c) = batch_store();
    let batch = BatchDrag::start(a, &selected(&[a, c]), &store).unwrap();
    let moves = batch.positions(Point::new(10.0, 0.0), BatchClamp::PerMember);
    let find = |m: MarkerRef| moves.iter().find(|(r, _)| *r == m).unwrap().1;
    assert_eq!(find(a), Point::new(20.0, 10.0));
    assert_eq!(find(c), Point::new(100.0, 50.0));
}

#[test]
fn batch_rigid_clamp_keeps_relative_offsets() {
    let (store, a, _, c) = batch_store();
    let batch = BatchDrag::start(a, &selected(&[a, c]), &store).unwrap();
    let moves = batch.positions(Point::new(10.0, 0.0), BatchClamp::Rigid);
    let find = |m: MarkerRef| moves.iter().find(|(r, _)| *r == m).unwrap().1;
    assert_eq!(find(a), Point::new(15.0, 10.0));
    assert_eq!(find(c), Point::new(100.0, 50.0));
}
