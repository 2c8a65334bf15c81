#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
    assert!(!Tool::Select.is_shape());
}

#[test]
fn tool_shape_flags() {
    assert!(Tool::Shape(ShapeKind::Rectangle).is_shape());
    assert!(!Tool::Shape(ShapeKind::Rectangle).is_freeform());
    assert!(Tool::Shape(ShapeKind::Freeform).is_freeform());
}

#[test]
fn tool_from_optional_kind() {
    assert_eq!(Tool::from(None), Tool::Select);
    assert_eq!(Tool::from(Some(ShapeKind::Stage)), Tool::Shape(ShapeKind::Stage));
}

// =============================================================
// Modifiers / Key
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn key_classification() {
    assert!(Key(" ".into()).is_space());
    assert!(Key("Delete".into()).is_delete());
    assert!(Key("Backspace".into()).is_delete());
    assert!(Key("Escape".into()).is_escape());
    assert!(!Key("a".into()).is_delete());
}

// =============================================================
// SelectionRect
// =============================================================

#[test]
fn selection_rect_normalizes_corners() {
    let r = SelectionRect::from_corners(Point::new(50.0, 10.0), Point::new(20.0, 40.0));
    assert_eq!(r, SelectionRect { x: 20.0, y: 10.0, width: 30.0, height: 30.0 });
}

// =============================================================
// UiState / InputState
// =============================================================

#[test]
fn ui_state_placing_flags() {
    let mut ui = UiState::default();
    assert!(!ui.is_placing());
    ui.is_placing_sections = true;
    assert!(ui.is_placing());
}

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}
