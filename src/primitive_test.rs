#![allow(clippy::float_cmp)]

use super::*;

fn shape(geometry: ShapeGeometry) -> PlacementShape {
    PlacementShape::new(geometry)
}

#[test]
fn missing_shape_draws_default_circle() {
    let visual = render_shape(None, &ShapeStyle::default(), 1000.0, 500.0, None);
    assert_eq!(visual.items.len(), 1);
    // 0.8% of the 500 px short side.
    assert_eq!(visual.items[0].primitive, Primitive::Circle { cx: 0.0, cy: 0.0, r: 4.0 });
}

#[test]
fn rectangle_corner_radius_is_clamped_to_half_side() {
    let s = shape(ShapeGeometry::Rectangle { width: 2.0, height: 2.0, corner_radius: 50.0 });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 1000.0, 500.0, None);
    let Primitive::Rect { width, height, corner_radius, .. } = visual.items[0].primitive else {
        panic!("expected rect");
    };
    assert_eq!(width, 20.0);
    assert_eq!(height, 10.0);
    assert_eq!(corner_radius, 5.0);
}

#[test]
fn ellipse_uses_half_extents() {
    let s = shape(ShapeGeometry::Ellipse { width: 4.0, height: 4.0 });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 1000.0, 500.0, None);
    assert_eq!(visual.items[0].primitive, Primitive::Ellipse { cx: 0.0, cy: 0.0, rx: 20.0, ry: 10.0 });
}

#[test]
fn freeform_draws_closed_path() {
    let s = shape(ShapeGeometry::Freeform {
        points: vec![Point::new(-1.0, -1.0), Point::new(1.0, -1.0), Point::new(0.0, 1.0)],
    });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 1000.0, 500.0, None);
    let Primitive::Path { points, closed } = &visual.items[0].primitive else {
        panic!("expected path");
    };
    assert!(*closed);
    assert_eq!(points[0], Point::new(-10.0, -5.0));
}

#[test]
fn sofa_is_composite() {
    let s = shape(ShapeGeometry::Sofa { width: 4.0, height: 3.0 });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 1000.0, 500.0, None);
    assert_eq!(visual.items.len(), 4);
}

#[test]
fn stage_has_label() {
    let s = shape(ShapeGeometry::Stage { width: 20.0, height: 10.0 });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 1000.0, 500.0, None);
    assert!(
        visual
            .items
            .iter()
            .any(|item| matches!(&item.primitive, Primitive::Text { text, .. } if text == "STAGE"))
    );
}

#[test]
fn own_rotation_applies_without_parent() {
    let mut s = shape(ShapeGeometry::Seat { width: 1.0, height: 1.0 });
    s.rotation = Some(30.0);
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 100.0, 100.0, None);
    assert_eq!(visual.rotation_deg, 30.0);
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 100.0, 100.0, Some(30.0));
    assert_eq!(visual.rotation_deg, 0.0);
}

#[test]
fn dash_pattern_is_carried_to_paint() {
    let style = ShapeStyle { dash: Some([6.0, 4.0]), ..ShapeStyle::default() };
    let visual = render_shape(None, &style, 100.0, 100.0, None);
    assert_eq!(visual.items[0].paint.dash, Some([6.0, 4.0]));
}

#[test]
fn dot_keeps_screen_size_under_zoom() {
    let visual = render_dot(&ShapeStyle::default(), 0.25);
    assert_eq!(visual.items[0].primitive, Primitive::Circle { cx: 0.0, cy: 0.0, r: 10.0 });
}

#[test]
fn bounding_radius_covers_rotated_rect_and_outline() {
    let s = shape(ShapeGeometry::Rectangle { width: 6.0, height: 8.0, corner_radius: 0.0 });
    let visual = render_shape(Some(&s), &ShapeStyle::default(), 100.0, 100.0, None);
    // Half-diagonal 5 px plus half of a 1 px outline.
    assert!((visual.bounding_radius(1.0) - 5.5).abs() < 1e-9);
    // The outline shrinks in layer pixels as zoom grows.
    assert!((visual.bounding_radius(2.0) - 5.25).abs() < 1e-9);
}

#[test]
fn bounding_radius_ignores_unstroked_items() {
    let visual = render_dot(&ShapeStyle::default(), 1.0);
    assert_eq!(visual.bounding_radius(1.0), 2.5);
}
