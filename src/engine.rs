use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::camera::{Camera, Point};
use crate::config::CanvasConfig;
use crate::consts::SURFACE_MAX_PCT;
use crate::doc::{MarkerRef, MarkerStore, SeatMarker, SectionMarker, ShapeOverlay};
use crate::draw::{DrawPreview, DrawSession, DrawnShape, FreeformStep};
use crate::hit::{self, Hit, StageBox};
use crate::input::{Button, InputState, Key, Modifiers, SelectionRect, Tool, UiState, WheelDelta};
use crate::layers::{DirtyLayers, Layer};
use crate::layout::{ImageRect, Projection, SurfaceLayout};
use crate::marker::{self, ActiveGesture, DragContext, ViewRegistry};
use crate::render::MarkerRaster;
use crate::render::{self, context_2d};
use crate::selection::{self, BatchDrag, MarqueeResult, SelectionState};
use crate::shape::{PlacementShape, ShapeKind};
use crate::transform::{self, FrameThrottle, GestureState, TransformHandle};
use crate::virtualize::{self, Visibility};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Everything the host passes down on each render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneProps {
    pub seats: Vec<SeatMarker>,
    pub sections: Vec<SectionMarker>,
    pub overlays: Vec<ShapeOverlay>,
    pub selection: SelectionState,
    /// Host-owned pan (stage pixels) and zoom.
    pub camera: Camera,
    pub is_placing_seats: bool,
    pub is_placing_sections: bool,
    pub read_only: bool,
    pub selected_shape_tool: Option<ShapeKind>,
    pub container_width: f64,
    pub container_height: f64,
    pub image_url: Option<String>,
    pub show_grid: bool,
    /// Grid step in percent.
    pub grid_size: f64,
}

/// New position of one marker in a batch drag, percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerMove {
    pub marker: MarkerRef,
    pub x: f64,
    pub y: f64,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    MarkerClick { marker: MarkerRef, shift: bool },
    MarkerDoubleClick { marker: MarkerRef },
    /// Live, unclamped position while dragging.
    MarkerDragMove { marker: MarkerRef, x: f64, y: f64 },
    /// Final position, clamped to the surface.
    MarkerDragEnd { marker: MarkerRef, x: f64, y: f64 },
    BatchDragEnd { moves: Vec<MarkerMove> },
    ShapeTransformEnd { marker: MarkerRef, shape: PlacementShape, position: Option<Point> },
    ShapeDraw { shape: PlacementShape, center: Point, width: Option<f64>, height: Option<f64> },
    MarqueeResult(MarqueeResult),
    /// Click on empty surface while placing seats or sections, percent.
    CanvasClick { x: f64, y: f64, shift: bool },
    /// Wheel over the stage; the host owns zoom.
    Wheel { x: f64, y: f64, dx: f64, dy: f64, ctrl: bool },
    PanStart,
    Pan { dx: f64, dy: f64 },
    PanEnd,
    Deselect,
    OverlayClick { id: String },
    OverlayHover { id: Option<String> },
    SetCursor { cursor: String },
    PreventDefault,
    RenderNeeded,
}

impl Action {
    fn cursor(cursor: &str) -> Self {
        Self::SetCursor { cursor: cursor.to_owned() }
    }

    fn shape_draw(drawn: DrawnShape) -> Self {
        Self::ShapeDraw { shape: drawn.shape, center: drawn.center, width: drawn.width, height: drawn.height }
    }
}

/// Load state of the background image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImageStatus {
    /// No image configured.
    #[default]
    None,
    Pending,
    Ready { width: f64, height: f64 },
    /// Load failed; drawn as a blank surface.
    Failed,
}

/// Predicate telling whether a text input currently has keyboard focus.
pub type TextFocusProbe = Box<dyn Fn() -> bool>;

/// Per-frame derived state shared by hit testing and painting.
#[derive(Debug, Clone)]
pub struct Frame {
    pub projection: Projection,
    pub visibility: Visibility,
    /// Display positions that differ from the store (drag in progress).
    pub positions: HashMap<MarkerRef, Point>,
    /// Shape of the marker under an active resize/rotate.
    pub live_shape: Option<(MarkerRef, PlacementShape)>,
    /// Stage box of the transform widget, if one is shown.
    pub handles: Option<StageBox>,
    pub active: Option<ActiveGesture>,
    pub preview: Option<DrawPreview>,
    /// Markers are deferred while the background image loads.
    pub markers_ready: bool,
}

/// Borrowed view of engine state handed to the painter.
pub struct Scene<'a> {
    pub store: &'a MarkerStore,
    pub ui: &'a UiState,
    pub config: &'a CanvasConfig,
    pub image: ImageStatus,
    pub frame: &'a Frame,
    pub viewport: (f64, f64),
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: MarkerStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub draw: DrawSession,
    pub config: CanvasConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    pub dirty: DirtyLayers,
    pub throttle: FrameThrottle,
    layout: SurfaceLayout,
    image_rect: Option<ImageRect>,
    image: ImageStatus,
    image_url: Option<String>,
    image_request: Option<String>,
    cursor: String,
    focus_probe: TextFocusProbe,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: MarkerStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            draw: DrawSession::new(),
            config: CanvasConfig::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            dirty: DirtyLayers::all(),
            throttle: FrameThrottle::default(),
            layout: SurfaceLayout::new(),
            image_rect: None,
            image: ImageStatus::None,
            image_url: None,
            image_request: None,
            cursor: "default".into(),
            focus_probe: Box::new(|| false),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Take a new snapshot of host state.
    pub fn set_scene(&mut self, props: SceneProps) {
        let tool = Tool::from(props.selected_shape_tool);
        if tool != self.ui.tool {
            if self.draw.cancel() {
                log::debug!("tool changed, drawing cancelled");
            }
            if matches!(self.input, InputState::Drawing) {
                self.input = InputState::Idle;
            }
        }
        self.ui.tool = tool;
        self.ui.is_placing_seats = props.is_placing_seats;
        self.ui.is_placing_sections = props.is_placing_sections;
        self.ui.read_only = props.read_only;
        self.ui.selection = props.selection;
        self.ui.show_grid = props.show_grid;
        self.ui.grid_size = props.grid_size;
        self.camera = props.camera;

        self.doc.load(props.seats, props.sections, props.overlays);
        if self.ui.hovered.is_some_and(|m| !self.doc.contains(m)) {
            self.ui.hovered = None;
        }

        self.set_image_url(props.image_url);
        if props.container_width > 0.0 && props.container_height > 0.0 {
            self.set_viewport(props.container_width, props.container_height, self.dpr);
        }
        self.dirty.mark_all();
    }

    /// Replace the tunable thresholds.
    pub fn set_config(&mut self, config: CanvasConfig) {
        self.config = config;
        self.relayout();
        self.dirty.mark_all();
    }

    /// Install the text-focus predicate consulted by keyboard shortcuts.
    pub fn set_focus_probe(&mut self, probe: TextFocusProbe) {
        self.focus_probe = probe;
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width: f64, height: f64, dpr: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.relayout();
        self.dirty.mark_all();
    }

    // --- Background image ---

    fn set_image_url(&mut self, url: Option<String>) {
        if url == self.image_url {
            return;
        }
        self.image = if url.is_some() { ImageStatus::Pending } else { ImageStatus::None };
        self.image_request.clone_from(&url);
        self.image_url = url;
        self.relayout();
        self.dirty.mark_all();
    }

    /// URL the browser side should start loading, if a new one was set.
    pub fn take_image_request(&mut self) -> Option<String> {
        self.image_request.take()
    }

    /// The background image at `url` finished loading.
    pub fn image_loaded(&mut self, url: &str, width: f64, height: f64) {
        if self.image_url.as_deref() != Some(url) {
            log::debug!("ignoring stale image load for {url}");
            return;
        }
        self.image = if width > 0.0 && height > 0.0 { ImageStatus::Ready { width, height } } else { ImageStatus::Failed };
        self.relayout();
        self.dirty.mark_all();
    }

    /// The background image at `url` could not be loaded; fall back to a blank surface.
    pub fn image_failed(&mut self, url: &str) {
        if self.image_url.as_deref() != Some(url) {
            return;
        }
        log::warn!("background image failed to load: {url}");
        self.image = ImageStatus::Failed;
        self.relayout();
        self.dirty.mark_all();
    }

    #[must_use]
    pub fn image_status(&self) -> ImageStatus {
        self.image
    }

    fn relayout(&mut self) {
        let natural = match self.image {
            ImageStatus::Ready { width, height } => Some((width, height)),
            _ => None,
        };
        let rect = self.layout.resolve(
            self.viewport_width,
            self.viewport_height,
            natural,
            self.config.fallback_aspect_ratio,
        );
        self.image_rect = rect;
    }

    // --- Queries ---

    /// The displayed image rectangle, once the container has a size.
    #[must_use]
    pub fn image_rect(&self) -> Option<ImageRect> {
        self.image_rect
    }

    #[must_use]
    pub fn projection(&self) -> Option<Projection> {
        Projection::new(self.image_rect?, self.camera, self.viewport_width, self.viewport_height)
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    fn markers_ready(&self) -> bool {
        self.image != ImageStatus::Pending
    }

    fn handle_owner(&self) -> Option<MarkerRef> {
        marker::transform_target(&self.ui, &self.doc)
    }

    fn drag_context(&self) -> DragContext {
        DragContext::from_ui(&self.ui, self.draw.path_in_progress())
    }

    fn hit(&self, pointer: Point, projection: &Projection) -> Option<Hit> {
        if !self.markers_ready() {
            return None;
        }
        hit::hit_test(pointer, &self.doc, projection, self.handle_owner(), self.config.rotate_hotspot_offset_px)
    }

    fn visibility(&self, projection: &Projection) -> Visibility {
        virtualize::compute_visibility(
            &self.doc,
            &self.ui.selection,
            projection,
            (self.viewport_width, self.viewport_height),
            &self.config,
        )
    }

    /// Derive everything the painter needs for this frame.
    #[must_use]
    pub fn frame(&self) -> Option<Frame> {
        let projection = self.projection()?;
        let image = projection.image();
        let mut positions = HashMap::new();
        let mut live_shape = None;
        let mut active = None;

        match &self.input {
            InputState::DraggingMarker { marker, current, batch, .. } => {
                active = Some(ActiveGesture::Drag(*marker));
                if let Some(batch) = batch {
                    let delta = batch.delta(*current);
                    positions.extend(batch.follower_positions(delta, self.config.batch_clamp));
                }
                positions.insert(*marker, *current);
            }
            InputState::Transforming(gesture) => {
                active = Some(ActiveGesture::Transform(gesture.marker));
                if let Some(view) = self.doc.get(gesture.marker) {
                    let base = view.shape.cloned().unwrap_or_else(PlacementShape::default_circle);
                    let shape =
                        transform::apply_transform(&base, gesture.scale_x, gesture.scale_y, gesture.rotation, &image);
                    positions.insert(gesture.marker, projection.stage_to_percentage(gesture.center));
                    live_shape = Some((gesture.marker, shape));
                }
            }
            _ => {}
        }

        let handles = self.handle_owner().and_then(|owner| {
            let view = self.doc.get(owner)?;
            let position = positions.get(&owner).copied().unwrap_or(view.position);
            let shape = live_shape.as_ref().filter(|(m, _)| *m == owner).map(|(_, s)| s).or(view.shape);
            Some(hit::marker_box(position, shape, &projection))
        });

        Some(Frame {
            visibility: self.visibility(&projection),
            positions,
            live_shape,
            handles,
            active,
            preview: self.draw.preview(&image),
            markers_ready: self.markers_ready(),
            projection,
        })
    }

    /// Read-only view of the state a frame is painted from.
    #[must_use]
    pub fn scene<'a>(&'a self, frame: &'a Frame) -> Scene<'a> {
        Scene {
            store: &self.doc,
            ui: &self.ui,
            config: &self.config,
            image: self.image,
            frame,
            viewport: (self.viewport_width, self.viewport_height),
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        match button {
            Button::Middle => return self.start_pan(screen_pt),
            Button::Primary if self.ui.space_held => return self.start_pan(screen_pt),
            Button::Primary => {}
            Button::Secondary => return Vec::new(),
        }
        let Some(projection) = self.projection() else {
            return Vec::new();
        };
        let hit = self.hit(screen_pt, &projection);
        let pct = projection.pointer_to_percentage(screen_pt);

        if let Tool::Shape(kind) = self.ui.tool {
            let blocked = hit.as_ref().is_some_and(Hit::blocks_drawing);
            let freeform_drag = kind == ShapeKind::Freeform
                && !self.draw.path_in_progress()
                && matches!(hit, Some(Hit::Marker(_)));
            if blocked && !freeform_drag {
                if let Some(Hit::Marker(marker)) = hit {
                    self.input =
                        InputState::PressedMarker { marker, start_screen: screen_pt, shift: modifiers.shift, draggable: false };
                }
                return Vec::new();
            }
            if !blocked {
                return self.draw_press(kind, pct);
            }
        }

        match hit {
            Some(Hit::Handle { marker, handle }) => self.start_transform(marker, handle, screen_pt, &projection),
            Some(Hit::Marker(marker)) => {
                let draggable = marker::can_drag(&self.drag_context());
                self.input = InputState::PressedMarker { marker, start_screen: screen_pt, shift: modifiers.shift, draggable };
                Vec::new()
            }
            Some(Hit::Overlay(id)) => {
                self.input = InputState::PressedOverlay { id, start_screen: screen_pt };
                Vec::new()
            }
            None => {
                self.input = InputState::Marquee { start: screen_pt, current: screen_pt };
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => self.hover(screen_pt),
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.camera.pan_x += dx;
                self.camera.pan_y += dy;
                self.input = InputState::Panning { last_screen: screen_pt };
                self.dirty.mark_all();
                vec![Action::Pan { dx, dy }, Action::RenderNeeded]
            }
            InputState::PressedMarker { marker, start_screen, shift, draggable } => {
                if !draggable || start_screen.distance(screen_pt) <= self.config.drag_threshold_px {
                    self.input = InputState::PressedMarker { marker, start_screen, shift, draggable };
                    return Vec::new();
                }
                self.start_drag(marker, start_screen);
                self.drag_to(screen_pt)
            }
            state @ InputState::DraggingMarker { .. } => {
                self.input = state;
                self.drag_to(screen_pt)
            }
            InputState::Transforming(mut gesture) => {
                gesture.update(screen_pt);
                self.input = InputState::Transforming(gesture);
                self.dirty.mark(Layer::Interactive);
                if self.throttle.request() { vec![Action::RenderNeeded] } else { Vec::new() }
            }
            InputState::Marquee { start, .. } => {
                self.input = InputState::Marquee { start, current: screen_pt };
                self.ui.marquee = Some(SelectionRect::from_corners(start, screen_pt));
                self.dirty.mark(Layer::Marquee);
                vec![Action::RenderNeeded]
            }
            InputState::Drawing => {
                self.input = InputState::Drawing;
                self.track_draw_pointer(screen_pt)
            }
            state @ InputState::PressedOverlay { .. } => {
                self.input = state;
                Vec::new()
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => {
                let cursor = if self.ui.space_held { "grab" } else { "default" };
                let mut actions = vec![Action::PanEnd];
                actions.extend(self.set_cursor(cursor));
                actions
            }
            InputState::PressedMarker { marker, shift, .. } => vec![Action::MarkerClick { marker, shift }],
            InputState::DraggingMarker { marker, grab_offset, start, batch, was_selected, .. } => {
                let current = match self.projection() {
                    Some(p) => {
                        let pct = p.pointer_to_percentage(screen_pt);
                        Point::new(pct.x + grab_offset.x, pct.y + grab_offset.y)
                    }
                    None => start,
                };
                self.finish_drag(marker, start, current, batch, was_selected, modifiers)
            }
            InputState::Transforming(gesture) => self.finish_transform(&gesture),
            InputState::Marquee { start, .. } => self.finish_marquee(start, screen_pt, modifiers),
            InputState::Drawing => {
                let drawn = match self.image_rect {
                    Some(image) => self.draw.finish_sizing(&image, self.config.min_draw_distance),
                    None => {
                        self.draw.cancel();
                        None
                    }
                };
                self.dirty.mark(Layer::Overlay);
                let mut actions: Vec<Action> = drawn.into_iter().map(Action::shape_draw).collect();
                actions.push(Action::RenderNeeded);
                actions
            }
            InputState::PressedOverlay { id, start_screen } => {
                if start_screen.distance(screen_pt) <= self.config.drag_threshold_px {
                    vec![Action::OverlayClick { id }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn on_double_click(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if self.ui.tool.is_freeform() && self.draw.path_in_progress() {
            return match self.draw.close_path() {
                Some(drawn) => {
                    self.dirty.mark(Layer::Overlay);
                    vec![Action::shape_draw(drawn), Action::RenderNeeded]
                }
                None => Vec::new(),
            };
        }
        let Some(projection) = self.projection() else {
            return Vec::new();
        };
        match self.hit(screen_pt, &projection) {
            Some(Hit::Marker(marker) | Hit::Handle { marker, .. }) => vec![Action::MarkerDoubleClick { marker }],
            _ => Vec::new(),
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        vec![
            Action::Wheel { x: screen_pt.x, y: screen_pt.y, dx: delta.dx, dy: delta.dy, ctrl: modifiers.ctrl || modifiers.meta },
            Action::PreventDefault,
        ]
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if (self.focus_probe)() {
            return Vec::new();
        }
        if key.is_space() {
            if self.ui.space_held {
                return vec![Action::PreventDefault];
            }
            self.ui.space_held = true;
            let mut actions = vec![Action::PreventDefault];
            actions.extend(self.set_cursor("grab"));
            return actions;
        }
        if key.is_delete() {
            if self.ui.tool.is_freeform() && self.draw.undo_point() {
                self.dirty.mark(Layer::Overlay);
                return vec![Action::PreventDefault, Action::RenderNeeded];
            }
            return Vec::new();
        }
        if key.is_escape() {
            return self.cancel_gesture();
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_space() || !self.ui.space_held {
            return Vec::new();
        }
        self.ui.space_held = false;
        if matches!(self.input, InputState::Panning { .. }) {
            return Vec::new();
        }
        self.set_cursor("default").into_iter().collect()
    }

    /// An animation frame fired; throttled redraw requests may be issued again.
    pub fn on_animation_frame(&mut self) {
        self.throttle.frame_done();
    }

    // --- Gesture helpers ---

    fn start_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.input = InputState::Panning { last_screen: screen_pt };
        let mut actions = vec![Action::PanStart];
        actions.extend(self.set_cursor("grabbing"));
        actions
    }

    fn draw_press(&mut self, kind: ShapeKind, pct: Point) -> Vec<Action> {
        self.dirty.mark(Layer::Overlay);
        if kind == ShapeKind::Freeform {
            return match self.draw.freeform_click(
                pct,
                self.config.freeform_point_spacing,
                self.config.freeform_close_distance,
            ) {
                FreeformStep::Added => vec![Action::RenderNeeded],
                FreeformStep::Ignored => Vec::new(),
                FreeformStep::Closed(drawn) => vec![Action::shape_draw(drawn), Action::RenderNeeded],
            };
        }
        self.draw.begin_sizing(kind, pct);
        self.input = InputState::Drawing;
        vec![Action::RenderNeeded]
    }

    fn track_draw_pointer(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(projection) = self.projection() else {
            return Vec::new();
        };
        self.draw.update(projection.pointer_to_percentage(screen_pt));
        self.dirty.mark(Layer::Overlay);
        vec![Action::RenderNeeded]
    }

    fn start_transform(
        &mut self,
        marker: MarkerRef,
        handle: TransformHandle,
        screen_pt: Point,
        projection: &Projection,
    ) -> Vec<Action> {
        if !marker::can_drag(&self.drag_context()) {
            return Vec::new();
        }
        let Some(view) = self.doc.get(marker) else {
            return Vec::new();
        };
        let b = hit::marker_box(view.position, view.shape, projection);
        self.input =
            InputState::Transforming(GestureState::new(marker, handle, b.center, (b.half_w, b.half_h), b.rotation, screen_pt));
        self.dirty.mark(Layer::Interactive);
        self.set_cursor(handle_cursor(handle)).into_iter().collect()
    }

    fn finish_transform(&mut self, gesture: &GestureState) -> Vec<Action> {
        self.throttle.frame_done();
        self.dirty.mark(Layer::Interactive);
        let mut actions = Vec::new();
        if let Some(projection) = self.projection() {
            let shape = self.doc.get(gesture.marker).and_then(|view| view.shape);
            if let Some(commit) = transform::commit_gesture(gesture, shape, &projection) {
                log::debug!("transformed {:?} {}", commit.marker.kind, commit.marker.id);
                actions.push(Action::ShapeTransformEnd {
                    marker: commit.marker,
                    shape: commit.shape,
                    position: commit.position,
                });
            }
        }
        actions.push(Action::RenderNeeded);
        actions.extend(self.set_cursor("default"));
        actions
    }

    fn start_drag(&mut self, marker: MarkerRef, start_screen: Point) {
        let (Some(projection), Some(view)) = (self.projection(), self.doc.get(marker)) else {
            return;
        };
        let pointer = projection.pointer_to_percentage(start_screen);
        let start = view.position;
        let batch = BatchDrag::start(marker, &self.ui.selection, &self.doc);
        self.input = InputState::DraggingMarker {
            marker,
            grab_offset: Point::new(start.x - pointer.x, start.y - pointer.y),
            start,
            current: start,
            batch,
            was_selected: self.ui.selection.contains(marker),
        };
        self.dirty.mark(Layer::Static);
    }

    fn drag_to(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(projection) = self.projection() else {
            return Vec::new();
        };
        let pct = projection.pointer_to_percentage(screen_pt);
        let InputState::DraggingMarker { marker, grab_offset, current, .. } = &mut self.input else {
            return Vec::new();
        };
        *current = Point::new(pct.x + grab_offset.x, pct.y + grab_offset.y);
        let (marker, position) = (*marker, *current);
        self.dirty.mark(Layer::Interactive);
        vec![Action::MarkerDragMove { marker, x: position.x, y: position.y }, Action::RenderNeeded]
    }

    fn finish_drag(
        &mut self,
        marker: MarkerRef,
        start: Point,
        current: Point,
        batch: Option<BatchDrag>,
        was_selected: bool,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.dirty.mark(Layer::Static);
        self.dirty.mark(Layer::Interactive);
        if start.distance(current) <= f64::EPSILON {
            return vec![Action::MarkerClick { marker, shift: modifiers.shift }, Action::RenderNeeded];
        }

        let mut actions = Vec::new();
        if let Some(batch) = batch {
            let moves: Vec<MarkerMove> = batch
                .positions(batch.delta(current), self.config.batch_clamp)
                .into_iter()
                .map(|(marker, p)| MarkerMove { marker, x: p.x, y: p.y })
                .collect();
            log::debug!("batch drag moved {} markers", moves.len());
            actions.push(Action::BatchDragEnd { moves });
        } else {
            let end = current.clamped(SURFACE_MAX_PCT);
            log::debug!("dragged {:?} {} to ({:.2}, {:.2})", marker.kind, marker.id, end.x, end.y);
            actions.push(Action::MarkerDragEnd { marker, x: end.x, y: end.y });
        }
        if !was_selected {
            actions.push(Action::MarkerClick { marker, shift: false });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn finish_marquee(&mut self, start: Point, end: Point, modifiers: Modifiers) -> Vec<Action> {
        self.ui.marquee = None;
        self.dirty.mark(Layer::Marquee);
        let Some(projection) = self.projection() else {
            return vec![Action::RenderNeeded];
        };

        if start.distance(end) <= self.config.drag_threshold_px {
            let mut actions = Vec::new();
            let pct = projection.pointer_to_percentage(end);
            let on_surface = (0.0..=SURFACE_MAX_PCT).contains(&pct.x) && (0.0..=SURFACE_MAX_PCT).contains(&pct.y);
            if self.ui.is_placing() && !self.ui.read_only && on_surface {
                actions.push(Action::CanvasClick { x: pct.x, y: pct.y, shift: modifiers.shift });
            } else if !modifiers.shift {
                actions.push(Action::Deselect);
            }
            actions.push(Action::RenderNeeded);
            return actions;
        }

        let result = selection::marquee_select(start, end, &projection, &self.doc);
        log::debug!(
            "marquee selected {} seats, {} sections",
            result.seat_ids.len(),
            result.section_ids.len()
        );
        vec![Action::MarqueeResult(result), Action::RenderNeeded]
    }

    fn cancel_gesture(&mut self) -> Vec<Action> {
        let mut cancelled = self.draw.cancel();
        match self.input {
            InputState::Drawing => self.input = InputState::Idle,
            InputState::Marquee { .. } => {
                self.input = InputState::Idle;
                self.ui.marquee = None;
                self.dirty.mark(Layer::Marquee);
                cancelled = true;
            }
            _ => {}
        }
        if !cancelled {
            return Vec::new();
        }
        self.dirty.mark(Layer::Overlay);
        vec![Action::PreventDefault, Action::RenderNeeded]
    }

    fn hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(projection) = self.projection() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if self.ui.tool.is_freeform() && self.draw.path_in_progress() {
            self.draw.update(projection.pointer_to_percentage(screen_pt));
            self.dirty.mark(Layer::Overlay);
            actions.push(Action::RenderNeeded);
        }

        let hit = self.hit(screen_pt, &projection);
        let hovered = match &hit {
            Some(Hit::Marker(m)) => Some(*m),
            _ => None,
        };
        let hovered_overlay = match &hit {
            Some(Hit::Overlay(id)) => Some(id.clone()),
            _ => None,
        };

        if hovered != self.ui.hovered {
            self.ui.hovered = hovered;
            if self.visibility(&projection).hover_enabled {
                self.dirty.mark(Layer::Static);
                self.dirty.mark(Layer::Interactive);
                push_render(&mut actions);
            }
        }
        if hovered_overlay != self.ui.hovered_overlay {
            self.ui.hovered_overlay.clone_from(&hovered_overlay);
            self.dirty.mark(Layer::Overlay);
            actions.push(Action::OverlayHover { id: hovered_overlay });
            push_render(&mut actions);
        }

        let cursor = match &hit {
            Some(Hit::Handle { handle, .. }) => handle_cursor(*handle),
            Some(Hit::Marker(_) | Hit::Overlay(_)) => "pointer",
            None if self.ui.space_held => "grab",
            None if self.ui.tool.is_shape() || self.ui.is_placing() => "crosshair",
            None => "default",
        };
        actions.extend(self.set_cursor(cursor));
        actions
    }

    fn set_cursor(&mut self, cursor: &str) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        cursor.clone_into(&mut self.cursor);
        Some(Action::cursor(cursor))
    }
}

fn handle_cursor(handle: TransformHandle) -> &'static str {
    match handle {
        TransformHandle::Rotate => "grab",
        TransformHandle::Resize(anchor) => anchor.cursor(),
    }
}

fn push_render(actions: &mut Vec<Action>) {
    if !actions.contains(&Action::RenderNeeded) {
        actions.push(Action::RenderNeeded);
    }
}

// =============================================================
// Browser wrapper
// =============================================================

enum ImageEvent {
    Loaded { url: String, width: f64, height: f64 },
    Failed { url: String },
}

type ImageEvents = Rc<RefCell<Vec<ImageEvent>>>;

/// Install the console logger for the `log` facade.
///
/// # Errors
///
/// Fails if a logger was already installed.
pub fn init_logging(level: log::Level) -> Result<(), log::SetLoggerError> {
    console_log::init_with_level(level)
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas elements.
pub struct Engine {
    canvas: HtmlCanvasElement,
    layers: Vec<(Layer, HtmlCanvasElement)>,
    image: Option<HtmlImageElement>,
    image_events: ImageEvents,
    on_image_load: Option<Closure<dyn FnMut()>>,
    on_image_error: Option<Closure<dyn FnMut()>>,
    request_render: Option<js_sys::Function>,
    registry: ViewRegistry<MarkerRaster>,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to `canvas`.
    ///
    /// `request_render` is called when something outside an input event (the
    /// background image finishing) needs a repaint.
    ///
    /// # Errors
    ///
    /// Fails if the document is unavailable or an offscreen layer canvas cannot be created.
    pub fn new(canvas: HtmlCanvasElement, request_render: Option<js_sys::Function>) -> Result<Self, JsValue> {
        let layers = Layer::ALL
            .into_iter()
            .map(|layer| -> Result<_, JsValue> { Ok((layer, render::create_canvas()?)) })
            .collect::<Result<Vec<_>, JsValue>>()?;

        let mut core = EngineCore::new();
        core.set_focus_probe(Box::new(text_field_focused));
        Ok(Self {
            canvas,
            layers,
            image: None,
            image_events: Rc::new(RefCell::new(Vec::new())),
            on_image_load: None,
            on_image_error: None,
            request_render,
            registry: ViewRegistry::new(),
            core,
        })
    }

    // --- Data inputs ---

    /// Take a new snapshot of host state, starting a background image load if its URL changed.
    ///
    /// # Errors
    ///
    /// Fails if an image element cannot be created.
    pub fn set_scene(&mut self, props: SceneProps) -> Result<(), JsValue> {
        let (w, h) = (props.container_width, props.container_height);
        self.core.set_scene(props);
        if w > 0.0 && h > 0.0 {
            self.resize_canvases();
        }
        self.load_background()
    }

    pub fn set_config(&mut self, config: CanvasConfig) {
        self.core.set_config(config);
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.resize_canvases();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn resize_canvases(&self) {
        let w = (self.core.viewport_width * self.core.dpr).round().max(0.0) as u32;
        let h = (self.core.viewport_height * self.core.dpr).round().max(0.0) as u32;
        for element in std::iter::once(&self.canvas).chain(self.layers.iter().map(|(_, c)| c)) {
            if element.width() != w || element.height() != h {
                element.set_width(w);
                element.set_height(h);
            }
        }
    }

    fn load_background(&mut self) -> Result<(), JsValue> {
        if self.core.image_status() == ImageStatus::None {
            self.image = None;
            self.on_image_load = None;
            self.on_image_error = None;
        }
        let Some(url) = self.core.take_image_request() else {
            return Ok(());
        };

        let image = HtmlImageElement::new()?;
        image.set_cross_origin(Some("anonymous"));

        let on_load = {
            let events = Rc::clone(&self.image_events);
            let request = self.request_render.clone();
            let element = image.clone();
            let url = url.clone();
            Closure::<dyn FnMut()>::new(move || {
                events.borrow_mut().push(ImageEvent::Loaded {
                    url: url.clone(),
                    width: f64::from(element.natural_width()),
                    height: f64::from(element.natural_height()),
                });
                notify(request.as_ref());
            })
        };
        let on_error = {
            let events = Rc::clone(&self.image_events);
            let request = self.request_render.clone();
            let url = url.clone();
            Closure::<dyn FnMut()>::new(move || {
                events.borrow_mut().push(ImageEvent::Failed { url: url.clone() });
                notify(request.as_ref());
            })
        };

        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        image.set_src(&url);

        self.image = Some(image);
        self.on_image_load = Some(on_load);
        self.on_image_error = Some(on_error);
        Ok(())
    }

    fn pump_image_events(&mut self) {
        let events: Vec<ImageEvent> = self.image_events.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                ImageEvent::Loaded { url, width, height } => self.core.image_loaded(&url, width, height),
                ImageEvent::Failed { url } => self.core.image_failed(&url),
            }
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_double_click(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_double_click(screen_pt, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_key_up(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(key, modifiers)
    }

    // --- Render ---

    /// Repaint dirty layers and composite them onto the visible canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a 2D context is unavailable or any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.pump_image_events();
        self.core.on_animation_frame();

        let main = context_2d(&self.canvas)?;
        let Some(frame) = self.core.frame() else {
            main.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
            main.clear_rect(0.0, 0.0, f64::from(self.canvas.width()), f64::from(self.canvas.height()));
            return Ok(());
        };

        let dirty = self.core.dirty.take();
        let dpr = self.core.dpr;
        let image = self.image.as_ref();
        self.registry.prune(&self.core.doc);
        let scene = self.core.scene(&frame);
        for (layer, element) in &self.layers {
            if dirty.contains(layer) {
                let ctx = context_2d(element)?;
                render::draw_layer(&ctx, *layer, &scene, &mut self.registry, image, dpr)?;
            }
        }

        main.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        main.clear_rect(0.0, 0.0, f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        for (_, element) in &self.layers {
            main.draw_image_with_html_canvas_element(element, 0.0, 0.0)?;
        }
        Ok(())
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn image_status(&self) -> ImageStatus {
        self.core.image_status()
    }
}

fn notify(request: Option<&js_sys::Function>) {
    if let Some(request) = request {
        if let Err(err) = request.call0(&JsValue::NULL) {
            log::warn!("render request callback failed: {err:?}");
        }
    }
}

fn text_field_focused() -> bool {
    let Some(active) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.active_element()) else {
        return false;
    };
    let tag = active.tag_name();
    if ["INPUT", "TEXTAREA", "SELECT"].iter().any(|t| tag.eq_ignore_ascii_case(t)) {
        return true;
    }
    active.dyn_ref::<HtmlElement>().is_some_and(HtmlElement::is_content_editable)
}
