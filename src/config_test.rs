#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn defaults_match_documented_thresholds() {
    let config = CanvasConfig::default();
    assert_eq!(config.virtualize_threshold, 40);
    assert_eq!(config.hover_animation_threshold, 100);
    assert_eq!(config.low_detail_zoom, 0.4);
    assert_eq!(config.viewport_padding, 0.2);
    assert_eq!(config.min_draw_distance, 0.3);
    assert_eq!(config.freeform_point_spacing, 0.1);
    assert_eq!(config.freeform_close_distance, 1.5);
    assert_eq!(config.batch_clamp, BatchClamp::PerMember);
}

#[test]
fn defaults_validate() {
    assert!(CanvasConfig::default().validate().is_ok());
}

#[test]
fn from_json_empty_object_is_default() {
    let config = CanvasConfig::from_json("{}").unwrap();
    assert_eq!(config, CanvasConfig::default());
}

#[test]
fn from_json_overrides_subset() {
    let config = CanvasConfig::from_json(r#"{"virtualizeThreshold": 10, "batchClamp": "rigid"}"#).unwrap();
    assert_eq!(config.virtualize_threshold, 10);
    assert_eq!(config.batch_clamp, BatchClamp::Rigid);
    assert_eq!(config.hover_animation_threshold, 100);
}

#[test]
fn from_json_rejects_malformed() {
    assert!(matches!(CanvasConfig::from_json("{not json"), Err(ConfigError::Parse(_))));
}

#[test]
fn from_json_rejects_negative_padding() {
    let err = CanvasConfig::from_json(r#"{"viewportPadding": -0.5}"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { name: "viewportPadding", .. }));
}

#[test]
fn from_json_rejects_zero_aspect() {
    let err = CanvasConfig::from_json(r#"{"fallbackAspectRatio": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { name: "fallbackAspectRatio", .. }));
}

#[test]
fn from_json_rejects_zero_low_detail_zoom() {
    let err = CanvasConfig::from_json(r#"{"lowDetailZoom": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { name: "lowDetailZoom", .. }));
}
