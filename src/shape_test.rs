#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn image() -> ImageRect {
    ImageRect { x: 0.0, y: 0.0, width: 1000.0, height: 500.0 }
}

// =============================================================
// Serialization
// =============================================================

#[test]
fn rectangle_serializes_with_screaming_type_and_camel_fields() {
    let mut shape = PlacementShape::new(ShapeGeometry::Rectangle { width: 4.0, height: 2.0, corner_radius: 0.5 });
    shape.fill_color = Some("#ff0000".into());
    let value = serde_json::to_value(&shape).unwrap();
    assert_eq!(value["type"], "RECTANGLE");
    assert_eq!(value["cornerRadius"], 0.5);
    assert_eq!(value["fillColor"], "#ff0000");
    assert!(value.get("rotation").is_none());
}

#[test]
fn from_json_parses_circle_with_integer_radius() {
    let shape = PlacementShape::from_json(r#"{"type":"CIRCLE","radius":2,"rotation":45}"#).unwrap();
    assert_eq!(shape.geometry, ShapeGeometry::Circle { radius: 2.0 });
    assert_eq!(shape.rotation_deg(), 45.0);
}

#[test]
fn from_json_rectangle_defaults_corner_radius() {
    let shape = PlacementShape::from_json(r#"{"type":"RECTANGLE","width":3,"height":1}"#).unwrap();
    assert_eq!(shape.geometry, ShapeGeometry::Rectangle { width: 3.0, height: 1.0, corner_radius: 0.0 });
}

#[test]
fn from_json_parses_freeform_points() {
    let raw = json!({
        "type": "FREEFORM",
        "points": [{"x": -1.0, "y": -1.0}, {"x": 1.0, "y": -1.0}, {"x": 0.0, "y": 2.0}],
        "strokeColor": "#333"
    })
    .to_string();
    let shape = PlacementShape::from_json(&raw).unwrap();
    assert_eq!(shape.kind(), ShapeKind::Freeform);
    assert_eq!(shape.stroke_color.as_deref(), Some("#333"));
}

#[test]
fn from_json_unknown_type_is_parse_error() {
    let err = PlacementShape::from_json(r#"{"type":"HEXAGRAM","radius":1}"#).unwrap_err();
    assert!(matches!(err, ShapeError::Parse(_)));
}

#[test]
fn from_json_negative_width_is_invalid() {
    let err = PlacementShape::from_json(r#"{"type":"SOFA","width":-2,"height":1}"#).unwrap_err();
    assert!(matches!(err, ShapeError::InvalidSize { kind: "SOFA", field: "width", .. }));
}

#[test]
fn from_json_polygon_needs_three_points() {
    let err = PlacementShape::from_json(r#"{"type":"POLYGON","points":[{"x":0,"y":0},{"x":1,"y":1}]}"#).unwrap_err();
    assert!(matches!(err, ShapeError::TooFewPoints { min: 3, count: 2, .. }));
}

#[test]
fn freeform_accepts_two_points() {
    let shape = PlacementShape::from_json(r#"{"type":"FREEFORM","points":[{"x":-1,"y":0},{"x":1,"y":0}]}"#).unwrap();
    assert_eq!(shape.kind(), ShapeKind::Freeform);
    let err = PlacementShape::from_json(r#"{"type":"FREEFORM","points":[{"x":0,"y":0}]}"#).unwrap_err();
    assert!(matches!(err, ShapeError::TooFewPoints { kind: "FREEFORM", min: 2, count: 1 }));
}

#[test]
fn default_circle_radius() {
    let shape = PlacementShape::default_circle();
    assert_eq!(shape.geometry, ShapeGeometry::Circle { radius: 0.8 });
    assert!(shape.validate().is_ok());
}

#[test]
fn kind_labels_round_trip_through_serde() {
    for kind in [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Polygon,
        ShapeKind::Freeform,
        ShapeKind::Sofa,
        ShapeKind::Stage,
        ShapeKind::Seat,
    ] {
        let value = serde_json::to_value(kind).unwrap();
        assert_eq!(value, kind.label());
    }
}

// =============================================================
// Pixel geometry
// =============================================================

#[test]
fn circle_extents_use_min_side() {
    let shape = PlacementShape::new(ShapeGeometry::Circle { radius: 2.0 });
    assert_eq!(shape.half_extents_px(&image()), (10.0, 10.0));
}

#[test]
fn rectangle_extents_use_each_axis() {
    let shape = PlacementShape::new(ShapeGeometry::Seat { width: 2.0, height: 2.0 });
    assert_eq!(shape.half_extents_px(&image()), (10.0, 5.0));
}

#[test]
fn polygon_extents_follow_farthest_point() {
    let shape = PlacementShape::new(ShapeGeometry::Polygon {
        points: vec![Point::new(-1.0, -2.0), Point::new(3.0, 0.0), Point::new(0.0, 1.0)],
    });
    assert_eq!(shape.half_extents_px(&image()), (30.0, 10.0));
}

#[test]
fn ellipse_contains_center_not_corner() {
    let shape = PlacementShape::new(ShapeGeometry::Ellipse { width: 4.0, height: 4.0 });
    assert!(shape.contains_local(Point::new(0.0, 0.0), &image()));
    assert!(!shape.contains_local(Point::new(19.0, 9.5), &image()));
}

#[test]
fn triangle_contains_centroid_only() {
    let shape = PlacementShape::new(ShapeGeometry::Freeform {
        points: vec![Point::new(-2.0, -2.0), Point::new(2.0, -2.0), Point::new(0.0, 4.0)],
    });
    assert!(shape.contains_local(Point::new(0.0, 0.0), &image()));
    assert!(!shape.contains_local(Point::new(19.0, 19.0), &image()));
}

#[test]
fn point_in_polygon_square() {
    let square = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
    assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
    assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
    assert!(!point_in_polygon(Point::new(5.0, 5.0), &square[..2]));
}
