use uuid::Uuid;

use super::*;
use crate::camera::Camera;
use crate::doc::{SeatInfo, SeatMarker};
use crate::layout::fit_contain;

fn projection(zoom: f64) -> Projection {
    Projection::new(fit_contain(1000.0, 1000.0, 1.0), Camera { pan_x: 0.0, pan_y: 0.0, zoom }, 1000.0, 1000.0).unwrap()
}

fn seats(n: usize, x: f64, y: f64) -> Vec<SeatMarker> {
    (0..n).map(|_| SeatMarker { id: Uuid::new_v4(), x, y, shape: None, seat: SeatInfo::default() }).collect()
}

#[test]
fn small_scene_renders_everything() {
    let mut store = MarkerStore::new();
    let mut all = seats(39, 50.0, 50.0);
    all.extend(seats(1, 99.0, 99.0));
    store.load(all, vec![], vec![]);

    let vis = compute_visibility(&store, &SelectionState::default(), &projection(10.0), (1000.0, 1000.0), &CanvasConfig::default());
    assert!(!vis.culled);
    assert_eq!(vis.markers.len(), 40);
}

#[test]
fn selected_marker_far_off_screen_stays_visible() {
    let mut store = MarkerStore::new();
    let mut all = seats(39, 50.0, 50.0);
    let far_selected = seats(1, 99.0, 99.0);
    let far_unselected = seats(1, 1.0, 1.0);
    let selected_id = far_selected[0].id;
    let unselected_id = far_unselected[0].id;
    all.extend(far_selected);
    all.extend(far_unselected);
    store.load(all, vec![], vec![]);
    assert_eq!(store.marker_count(), 41);

    let mut selection = SelectionState::default();
    selection.seats.insert(selected_id);

    let vis = compute_visibility(&store, &selection, &projection(10.0), (1000.0, 1000.0), &CanvasConfig::default());
    assert!(vis.culled);
    assert!(vis.contains(MarkerRef::seat(selected_id)));
    assert!(!vis.contains(MarkerRef::seat(unselected_id)));
    assert_eq!(vis.markers.len(), 40);
}

#[test]
fn window_includes_padding() {
    // Zoom 10 on a 1000 px square: the viewport shows 45..55 percent; 20 % padding widens it to 43..57.
    let window = visible_window(&projection(10.0), 1000.0, 1000.0, 0.2);
    assert!(window.contains(Point::new(43.5, 56.5)));
    assert!(!window.contains(Point::new(42.0, 50.0)));
}

#[test]
fn hover_disabled_above_threshold() {
    let mut store = MarkerStore::new();
    store.load(seats(101, 50.0, 50.0), vec![], vec![]);
    let vis = compute_visibility(&store, &SelectionState::default(), &projection(1.0), (1000.0, 1000.0), &CanvasConfig::default());
    assert!(!vis.hover_enabled);

    store.load(seats(100, 50.0, 50.0), vec![], vec![]);
    let vis = compute_visibility(&store, &SelectionState::default(), &projection(1.0), (1000.0, 1000.0), &CanvasConfig::default());
    assert!(vis.hover_enabled);
}

#[test]
fn low_detail_below_zoom_threshold() {
    let store = MarkerStore::new();
    let config = CanvasConfig::default();
    let vis = compute_visibility(&store, &SelectionState::default(), &projection(0.3), (1000.0, 1000.0), &config);
    assert!(vis.low_detail);
    let vis = compute_visibility(&store, &SelectionState::default(), &projection(0.4), (1000.0, 1000.0), &config);
    assert!(!vis.low_detail);
}
