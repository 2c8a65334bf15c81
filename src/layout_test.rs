#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// =============================================================
// fit_contain
// =============================================================

#[test]
fn fit_contain_matching_aspect_fills_container() {
    let rect = fit_contain(800.0, 600.0, 4.0 / 3.0);
    assert!(approx_eq(rect.width, 800.0));
    assert!(approx_eq(rect.height, 600.0));
    assert!(approx_eq(rect.x, 0.0));
    assert!(approx_eq(rect.y, 0.0));
}

#[test]
fn fit_contain_wide_image_letterboxes_vertically() {
    let rect = fit_contain(800.0, 600.0, 16.0 / 9.0);
    assert!(approx_eq(rect.width, 800.0));
    assert!(rect.height < 600.0);
    assert!(approx_eq(rect.height, 450.0));
    assert!(rect.y > 0.0);
    assert!(approx_eq(rect.y, 75.0));
}

#[test]
fn fit_contain_tall_image_pillarboxes() {
    let rect = fit_contain(800.0, 600.0, 0.5);
    assert!(approx_eq(rect.height, 600.0));
    assert!(approx_eq(rect.width, 300.0));
    assert!(approx_eq(rect.x, 250.0));
}

#[test]
fn fit_contain_degenerate_container_is_empty() {
    assert!(!fit_contain(0.0, 600.0, 1.0).is_valid());
    assert!(!fit_contain(800.0, 600.0, 0.0).is_valid());
}

// =============================================================
// SurfaceLayout
// =============================================================

#[test]
fn surface_layout_uses_image_aspect() {
    let mut layout = SurfaceLayout::new();
    let rect = layout.resolve(800.0, 600.0, Some((1600.0, 900.0)), 4.0 / 3.0).unwrap();
    assert!(approx_eq(rect.height, 450.0));
    assert!(layout.locked_size().is_none());
}

#[test]
fn surface_layout_locks_first_size_without_image() {
    let mut layout = SurfaceLayout::new();
    let first = layout.resolve(800.0, 600.0, None, 4.0 / 3.0).unwrap();
    let resized = layout.resolve(1200.0, 500.0, None, 4.0 / 3.0).unwrap();
    assert_eq!(first, resized);
    assert_eq!(layout.locked_size(), Some((800.0, 600.0)));
}

#[test]
fn surface_layout_lock_resets_when_image_arrives() {
    let mut layout = SurfaceLayout::new();
    layout.resolve(800.0, 600.0, None, 4.0 / 3.0);
    layout.resolve(1000.0, 500.0, Some((200.0, 100.0)), 4.0 / 3.0);
    assert!(layout.locked_size().is_none());

    // Image gone again: the next measured size is locked afresh.
    layout.resolve(640.0, 480.0, None, 4.0 / 3.0);
    assert_eq!(layout.locked_size(), Some((640.0, 480.0)));
}

#[test]
fn surface_layout_waits_for_container() {
    let mut layout = SurfaceLayout::new();
    assert!(layout.resolve(0.0, 0.0, None, 4.0 / 3.0).is_none());
    assert!(layout.locked_size().is_none());
}

#[test]
fn surface_layout_ignores_zero_sized_image() {
    let mut layout = SurfaceLayout::new();
    let rect = layout.resolve(800.0, 600.0, Some((0.0, 0.0)), 4.0 / 3.0).unwrap();
    assert!(approx_eq(rect.width, 800.0));
    assert!(layout.locked_size().is_some());
}

// =============================================================
// Projection
// =============================================================

fn projection(camera: Camera) -> Projection {
    let image = fit_contain(800.0, 600.0, 16.0 / 9.0);
    Projection::new(image, camera, 800.0, 600.0).unwrap()
}

#[test]
fn projection_rejects_invalid_image() {
    let image = ImageRect { x: 0.0, y: 0.0, width: 0.0, height: 10.0 };
    assert!(Projection::new(image, Camera::default(), 800.0, 600.0).is_none());
}

#[test]
fn percentage_origin_maps_to_image_corner() {
    let proj = projection(Camera::default());
    let stage = proj.percentage_to_stage(Point::new(0.0, 0.0));
    assert!(point_approx_eq(stage, Point::new(0.0, 75.0)));
    let stage = proj.percentage_to_stage(Point::new(100.0, 100.0));
    assert!(point_approx_eq(stage, Point::new(800.0, 525.0)));
}

#[test]
fn round_trip_over_grid_with_pan_and_zoom() {
    let cameras = [
        Camera::default(),
        Camera { pan_x: 120.0, pan_y: -40.0, zoom: 2.5 },
        Camera { pan_x: -300.0, pan_y: 80.0, zoom: 0.3 },
    ];
    for camera in cameras {
        let proj = projection(camera);
        for i in 0..=10 {
            for j in 0..=10 {
                let pct = Point::new(f64::from(i) * 10.0, f64::from(j) * 10.0);
                let back = proj.stage_to_percentage(proj.percentage_to_stage(pct));
                assert!(point_approx_eq(back, pct), "{pct:?} -> {back:?} under {camera:?}");
            }
        }
    }
}

#[test]
fn layer_to_percentage_ignores_camera() {
    let proj = projection(Camera { pan_x: 500.0, pan_y: 500.0, zoom: 3.0 });
    let pct = proj.layer_to_percentage(Point::new(400.0, 300.0));
    assert!(point_approx_eq(pct, Point::new(50.0, 50.0)));
}

#[test]
fn pointer_to_percentage_matches_stage_inverse() {
    let proj = projection(Camera { pan_x: 10.0, pan_y: 20.0, zoom: 1.5 });
    let pointer = Point::new(321.0, 123.0);
    assert_eq!(proj.pointer_to_percentage(pointer), proj.stage_to_percentage(pointer));
}

#[test]
fn percentage_lengths_resolve_against_axes() {
    let proj = projection(Camera::default());
    assert!(approx_eq(proj.width_pct_to_px(10.0), 80.0));
    assert!(approx_eq(proj.height_pct_to_px(10.0), 45.0));
    assert!(approx_eq(proj.min_pct_to_px(10.0), 45.0));
}
