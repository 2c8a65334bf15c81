//! Input model: tools, modifier keys, mouse buttons, host-supplied UI flags,
//! and the pointer gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` mirrors the interaction flags the host passes each render.
//! `InputState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to emit the final action on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::MarkerRef;
use crate::selection::{BatchDrag, SelectionState};
use crate::shape::ShapeKind;
use crate::transform::GestureState;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Create a new shape of this kind.
    Shape(ShapeKind),
}

impl Tool {
    /// Whether a shape-drawing tool is active.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Whether the click-to-add-point freeform tool is active.
    #[must_use]
    pub fn is_freeform(self) -> bool {
        self == Self::Shape(ShapeKind::Freeform)
    }
}

impl From<Option<ShapeKind>> for Tool {
    fn from(kind: Option<ShapeKind>) -> Self {
        kind.map_or(Self::Select, Self::Shape)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.0 == "Space" || self.0 == "Spacebar"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Axis-aligned rectangle in stage pixels, as dragged by the marquee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Normalized rectangle spanning two corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { x: a.x.min(b.x), y: a.y.min(b.y), width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }
}

/// Interaction flags and selection passed down by the host each render.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active drawing tool.
    pub tool: Tool,
    pub is_placing_seats: bool,
    pub is_placing_sections: bool,
    pub read_only: bool,
    pub selection: SelectionState,
    pub show_grid: bool,
    /// Grid step in percent.
    pub grid_size: f64,
    /// Marker under the pointer, tracked by the engine.
    pub hovered: Option<MarkerRef>,
    /// Overlay under the pointer, tracked by the engine.
    pub hovered_overlay: Option<String>,
    /// Live marquee rectangle while dragging one.
    pub marquee: Option<SelectionRect>,
    /// Space is held: primary-button drags pan instead of selecting.
    pub space_held: bool,
}

impl UiState {
    /// Whether a placement mode (adding seats or sections) is active.
    #[must_use]
    pub fn is_placing(&self) -> bool {
        self.is_placing_seats || self.is_placing_sections
    }
}

/// Internal state for the pointer gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The canvas is being panned (middle button or Space + drag).
    Panning {
        /// Stage position of the previous pointer event, used to compute the pan delta.
        last_screen: Point,
    },
    /// Pointer went down on a marker but has not yet moved past the drag threshold.
    PressedMarker {
        marker: MarkerRef,
        start_screen: Point,
        shift: bool,
        /// Whether dragging is allowed once the threshold is crossed.
        draggable: bool,
    },
    /// A marker (and possibly the rest of the selection) is being dragged.
    DraggingMarker {
        marker: MarkerRef,
        /// Marker position minus pointer position at grab time, in percent.
        grab_offset: Point,
        /// Marker position at drag start, in percent.
        start: Point,
        /// Live (unclamped) marker position, in percent.
        current: Point,
        /// Present when the whole selection moves together.
        batch: Option<BatchDrag>,
        /// Whether the marker was selected before the drag started.
        was_selected: bool,
    },
    /// A transform handle is being dragged.
    Transforming(GestureState),
    /// A marquee rectangle is being dragged from `start` (stage pixels).
    Marquee { start: Point, current: Point },
    /// A drag-to-size shape is being drawn; the geometry lives in the draw session.
    Drawing,
    /// Pointer went down on an overlay; released in place it is a click.
    PressedOverlay { id: String, start_screen: Point },
}
