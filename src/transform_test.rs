#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::camera::Camera;
use crate::layout::fit_contain;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn image() -> ImageRect {
    ImageRect { x: 0.0, y: 0.0, width: 800.0, height: 600.0 }
}

fn shape(geometry: ShapeGeometry) -> PlacementShape {
    PlacementShape::new(geometry)
}

// =============================================================
// apply_transform: per-type rules
// =============================================================

#[test]
fn circle_uses_larger_axis() {
    let s = shape(ShapeGeometry::Circle { radius: 2.0 });
    let out = apply_transform(&s, 1.5, -3.0, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Circle { radius: 6.0 });
}

#[test]
fn circle_scaled_to_zero_keeps_floor() {
    let s = shape(ShapeGeometry::Circle { radius: 2.0 });
    let out = apply_transform(&s, 0.0, 0.0, 0.0, &image());
    let ShapeGeometry::Circle { radius } = out.geometry else {
        panic!("expected circle");
    };
    assert!(radius >= 0.1);
}

#[test]
fn rectangle_scaled_to_zero_keeps_floors() {
    let s = shape(ShapeGeometry::Rectangle { width: 5.0, height: 5.0, corner_radius: 1.0 });
    let out = apply_transform(&s, 0.0, 0.0, 0.0, &image());
    let ShapeGeometry::Rectangle { width, height, corner_radius } = out.geometry else {
        panic!("expected rectangle");
    };
    assert!(width >= 0.1);
    assert!(height >= 0.1);
    // 0.1% of 800 = 0.8 px, 0.1% of 600 = 0.6 px; half the smaller is 0.3 px = 0.05% of 600.
    assert!(approx_eq(corner_radius, 0.05));
}

#[test]
fn rectangle_scales_axes_independently() {
    let s = shape(ShapeGeometry::Rectangle { width: 4.0, height: 2.0, corner_radius: 0.0 });
    let out = apply_transform(&s, 2.0, 0.5, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Rectangle { width: 8.0, height: 1.0, corner_radius: 0.0 });
}

#[test]
fn ellipse_and_seat_use_absolute_scale() {
    let s = shape(ShapeGeometry::Ellipse { width: 4.0, height: 2.0 });
    let out = apply_transform(&s, -2.0, -1.0, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Ellipse { width: 8.0, height: 2.0 });

    let s = shape(ShapeGeometry::Seat { width: 1.0, height: 1.0 });
    let out = apply_transform(&s, 3.0, 2.0, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Seat { width: 3.0, height: 2.0 });
}

#[test]
fn freeform_points_scale_by_mean() {
    let s = shape(ShapeGeometry::Freeform {
        points: vec![Point::new(-1.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 2.0)],
    });
    let out = apply_transform(&s, 1.0, 3.0, 0.0, &image());
    let ShapeGeometry::Freeform { points } = out.geometry else {
        panic!("expected freeform");
    };
    assert_eq!(points, vec![Point::new(-2.0, 0.0), Point::new(2.0, 0.0), Point::new(0.0, 4.0)]);
}

#[test]
fn stage_is_uniform_with_floors() {
    let s = shape(ShapeGeometry::Stage { width: 20.0, height: 10.0 });
    let out = apply_transform(&s, 2.0, 1.0, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Stage { width: 30.0, height: 15.0 });

    let out = apply_transform(&s, 0.0, 0.0, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Stage { width: 5.0, height: 3.0 });
}

#[test]
fn sofa_floors() {
    let s = shape(ShapeGeometry::Sofa { width: 4.0, height: 3.0 });
    let out = apply_transform(&s, 0.1, 0.1, 0.0, &image());
    assert_eq!(out.geometry, ShapeGeometry::Sofa { width: 2.0, height: 1.5 });
}

#[test]
fn rotation_and_colors_are_kept() {
    let mut s = shape(ShapeGeometry::Circle { radius: 1.0 });
    s.fill_color = Some("#abc".into());
    let out = apply_transform(&s, 1.0, 1.0, -42.0, &image());
    assert_eq!(out.rotation, Some(-42.0));
    assert_eq!(out.fill_color.as_deref(), Some("#abc"));
}

// =============================================================
// GestureState
// =============================================================

fn gesture(handle: TransformHandle) -> GestureState {
    GestureState::new(
        MarkerRef::seat(Uuid::new_v4()),
        handle,
        Point::new(100.0, 100.0),
        (10.0, 10.0),
        0.0,
        Point::new(110.0, 110.0),
    )
}

#[test]
fn new_gesture_is_noop() {
    assert!(gesture(TransformHandle::Rotate).is_noop());
}

#[test]
fn se_resize_doubles_and_shifts_center() {
    let mut g = gesture(TransformHandle::Resize(ResizeAnchor::Se));
    g.update(Point::new(130.0, 130.0));
    assert!(approx_eq(g.scale_x, 2.0));
    assert!(approx_eq(g.scale_y, 2.0));
    // NW corner (90, 90) stays pinned, so the center moves to (110, 110).
    assert!(approx_eq(g.center.x, 110.0));
    assert!(approx_eq(g.center.y, 110.0));
}

#[test]
fn east_edge_resize_only_scales_x() {
    let mut g = gesture(TransformHandle::Resize(ResizeAnchor::E));
    g.update(Point::new(100.0, 150.0));
    assert!(approx_eq(g.scale_x, 0.5));
    assert!(approx_eq(g.scale_y, 1.0));
}

#[test]
fn rotate_quarter_turn() {
    let mut g = gesture(TransformHandle::Rotate);
    g.start_pointer = Point::new(100.0, 50.0);
    g.update(Point::new(150.0, 100.0));
    assert!(approx_eq(g.rotation, 90.0));
    assert!(!g.is_noop());
}

#[test]
fn commit_reports_position_when_center_moves() {
    let image = fit_contain(800.0, 600.0, 4.0 / 3.0);
    let projection = Projection::new(image, Camera::default(), 800.0, 600.0).unwrap();
    let s = shape(ShapeGeometry::Seat { width: 2.5, height: 2.5 });

    let mut g = gesture(TransformHandle::Resize(ResizeAnchor::Se));
    g.update(Point::new(130.0, 130.0));
    let commit = commit_gesture(&g, Some(&s), &projection).unwrap();
    assert_eq!(commit.shape.geometry, ShapeGeometry::Seat { width: 5.0, height: 5.0 });
    let pos = commit.position.unwrap();
    assert!(approx_eq(pos.x, 110.0 / 8.0));
    assert!(approx_eq(pos.y, 110.0 / 6.0));
}

#[test]
fn commit_noop_gesture_is_none() {
    let image = fit_contain(800.0, 600.0, 4.0 / 3.0);
    let projection = Projection::new(image, Camera::default(), 800.0, 600.0).unwrap();
    let g = gesture(TransformHandle::Rotate);
    assert!(commit_gesture(&g, None, &projection).is_none());
}

#[test]
fn rotate_commit_keeps_position() {
    let image = fit_contain(800.0, 600.0, 4.0 / 3.0);
    let projection = Projection::new(image, Camera::default(), 800.0, 600.0).unwrap();
    let mut g = gesture(TransformHandle::Rotate);
    g.start_pointer = Point::new(100.0, 50.0);
    g.update(Point::new(50.0, 100.0));
    let commit = commit_gesture(&g, None, &projection).unwrap();
    assert!(commit.position.is_none());
    assert_eq!(commit.shape.rotation, Some(-90.0));
}

// =============================================================
// FrameThrottle
// =============================================================

#[test]
fn throttle_coalesces_until_frame() {
    let mut throttle = FrameThrottle::default();
    assert!(throttle.request());
    assert!(!throttle.request());
    assert!(throttle.is_pending());
    throttle.frame_done();
    assert!(throttle.request());
}
