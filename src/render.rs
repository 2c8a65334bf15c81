//! Rendering: paints one layer of the scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a read-only [`Scene`] and produces pixels; the only state it
//! touches is the raster cache of marker bitmaps.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::Point;
use crate::consts::{HANDLE_RADIUS_PX, MARQUEE_DASH_PX, MAX_RASTER_SIDE_PX, PREVIEW_DASH_PX, SURFACE_MAX_PCT};
use crate::draw::DrawPreview;
use crate::engine::{ImageStatus, Scene};
use crate::hit::{self, StageBox};
use crate::input::SelectionRect;
use crate::layers::{self, Layer};
use crate::layout::{ImageRect, Projection};
use crate::marker::{self, CacheKey, ViewRegistry};
use crate::primitive::{self, DrawItem, Paint, Primitive, ShapeStyle, ShapeVisual};

const STAGE_BACKDROP: &str = "#E9ECF0";
const SURFACE_FILL: &str = "#FFFFFF";
const SURFACE_BORDER: &str = "#C9CED6";
const LOADING_FILL: &str = "#F4F5F7";
const LOADING_TEXT: &str = "#8A9099";
const GRID_STROKE: &str = "rgba(31, 58, 95, 0.12)";
const ACCENT: &str = "#1E90FF";
const LABEL_FILL: &str = "#1F1A17";

/// Upper bound on grid lines per axis, so a tiny grid step cannot stall a frame.
const MAX_GRID_LINES: u32 = 400;

/// Section and overlay label size in screen pixels.
const LABEL_PX: f64 = 12.0;

/// A marker's visual painted once into its own offscreen canvas.
///
/// The bitmap is centered on the marker position and spans `radius` layer
/// pixels on each side, so it can be blitted without re-tracing any path.
#[derive(Debug)]
pub struct MarkerRaster {
    canvas: HtmlCanvasElement,
    radius: f64,
}

/// A detached `<canvas>` element for offscreen drawing.
///
/// # Errors
///
/// Fails if the document is unavailable or the element cannot be created.
pub fn create_canvas() -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(JsValue::from)
}

/// 2D context of `canvas`.
///
/// # Errors
///
/// Fails if the canvas has no 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Paint `visual` into a fresh bitmap at `scale` device pixels per layer pixel.
fn rasterize(visual: &ShapeVisual, zoom: f64, scale: f64) -> Result<MarkerRaster, JsValue> {
    let radius = visual.bounding_radius(zoom).max(1.0);
    let side = (radius * 2.0 * scale).ceil().clamp(1.0, MAX_RASTER_SIDE_PX);
    let canvas = create_canvas()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let side_px = side as u32;
    canvas.set_width(side_px);
    canvas.set_height(side_px);

    let ctx = context_2d(&canvas)?;
    let s = side / (radius * 2.0);
    ctx.set_transform(s, 0.0, 0.0, s, side / 2.0, side / 2.0)?;
    paint_visual(&ctx, Point::new(0.0, 0.0), visual, zoom)?;
    Ok(MarkerRaster { canvas, radius })
}

fn blit(ctx: &CanvasRenderingContext2d, at: Point, raster: &MarkerRaster) -> Result<(), JsValue> {
    let r = raster.radius;
    ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&raster.canvas, at.x - r, at.y - r, r * 2.0, r * 2.0)
}

/// Paint `layer` of `scene`, clearing it first.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw_layer(
    ctx: &CanvasRenderingContext2d,
    layer: Layer,
    scene: &Scene<'_>,
    registry: &mut ViewRegistry<MarkerRaster>,
    image: Option<&HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    let (vw, vh) = scene.viewport;
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, vw, vh);

    match layer {
        Layer::Background => draw_background(ctx, scene, image, dpr),
        Layer::Static | Layer::Interactive => {
            draw_markers(ctx, scene, registry, layer, dpr)?;
            if layer == Layer::Interactive {
                if let Some(b) = scene.frame.handles {
                    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
                    draw_handles(ctx, &b, scene.config.rotate_hotspot_offset_px)?;
                }
            }
            Ok(())
        }
        Layer::Overlay => {
            draw_overlays(ctx, scene, dpr)?;
            draw_preview(ctx, scene, dpr)
        }
        Layer::Marquee => match scene.ui.marquee {
            Some(rect) => draw_marquee(ctx, rect),
            None => Ok(()),
        },
    }
}

// =============================================================
// Background
// =============================================================

fn draw_background(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene<'_>,
    image: Option<&HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    let (vw, vh) = scene.viewport;
    ctx.set_fill_style_str(STAGE_BACKDROP);
    ctx.fill_rect(0.0, 0.0, vw, vh);

    let projection = &scene.frame.projection;
    let zoom = projection.zoom();
    let rect = projection.image();
    apply_camera(ctx, projection, scene.viewport, dpr)?;

    match (scene.image, image) {
        (ImageStatus::Ready { .. }, Some(element)) => {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(element, rect.x, rect.y, rect.width, rect.height)?;
        }
        (ImageStatus::Pending, _) => {
            ctx.set_fill_style_str(LOADING_FILL);
            ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            ctx.set_fill_style_str(LOADING_TEXT);
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            ctx.set_font(&format!("{:.1}px sans-serif", 14.0 / zoom));
            ctx.fill_text("Loading floor plan…", rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)?;
        }
        _ => {
            ctx.set_fill_style_str(SURFACE_FILL);
            ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
        }
    }

    ctx.set_stroke_style_str(SURFACE_BORDER);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);

    if scene.ui.show_grid {
        draw_grid(ctx, &rect, scene.ui.grid_size, zoom);
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_grid(ctx: &CanvasRenderingContext2d, rect: &ImageRect, step: f64, zoom: f64) {
    if !step.is_finite() || step <= 0.0 {
        return;
    }
    let lines = ((SURFACE_MAX_PCT / step).floor() as u32).min(MAX_GRID_LINES);

    ctx.set_stroke_style_str(GRID_STROKE);
    ctx.set_line_width(1.0 / zoom);
    ctx.begin_path();
    for i in 1..=lines {
        let pct = f64::from(i) * step;
        let x = rect.x + pct * rect.width / SURFACE_MAX_PCT;
        let y = rect.y + pct * rect.height / SURFACE_MAX_PCT;
        ctx.move_to(x, rect.y);
        ctx.line_to(x, rect.y + rect.height);
        ctx.move_to(rect.x, y);
        ctx.line_to(rect.x + rect.width, y);
    }
    ctx.stroke();
}

// =============================================================
// Markers
// =============================================================

fn draw_markers(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene<'_>,
    registry: &mut ViewRegistry<MarkerRaster>,
    target: Layer,
    dpr: f64,
) -> Result<(), JsValue> {
    let frame = scene.frame;
    if !frame.markers_ready {
        return Ok(());
    }
    let projection = &frame.projection;
    let image = projection.image();
    let zoom = projection.zoom();
    let vis = &frame.visibility;
    apply_camera(ctx, projection, scene.viewport, dpr)?;

    for &m in &vis.markers {
        let Some(view) = scene.store.get(m) else {
            continue;
        };
        let selected = scene.ui.selection.contains(m);
        let hovered = vis.hover_enabled && scene.ui.hovered == Some(m);
        let moving = frame.positions.contains_key(&m);
        if layers::marker_layer(selected, hovered, moving) != target {
            continue;
        }

        let position = frame.positions.get(&m).copied().unwrap_or(view.position);
        let live = frame.live_shape.as_ref().filter(|(owner, _)| *owner == m).map(|(_, s)| s);
        let shape = live.or(view.shape);
        let phase = marker::marker_phase(m, scene.ui, frame.active);
        let style = marker::marker_style(m.kind, shape, phase, scene.ui.selection.is_anchor(m), vis.hover_enabled);
        let at = projection.percentage_to_layer(position);

        if vis.low_detail {
            paint_visual(ctx, at, &primitive::render_dot(&style, zoom), zoom)?;
            continue;
        }
        if live.is_none() && marker::is_cacheable(phase, vis.low_detail) {
            let scale = zoom * dpr;
            let key = CacheKey::new(shape, position, (image.width, image.height), scale, selected);
            let raster = registry.resolve(m, key, || {
                rasterize(&primitive::render_shape(shape, &style, image.width, image.height, None), zoom, scale)
            })?;
            blit(ctx, at, raster)?;
        } else {
            let visual = primitive::render_shape(shape, &style, image.width, image.height, None);
            paint_visual(ctx, at, &visual, zoom)?;
        }

        if let Some(name) = view.name {
            draw_label(ctx, at, name, zoom)?;
        }
    }
    Ok(())
}

fn draw_handles(ctx: &CanvasRenderingContext2d, b: &StageBox, rotate_offset_px: f64) -> Result<(), JsValue> {
    let handles = hit::resize_handle_positions(b);
    ctx.save();

    // Dashed outline through the four corners (NE, SE, SW, NW).
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_line_width(1.0);
    set_dash(ctx, Some([MARQUEE_DASH_PX, MARQUEE_DASH_PX]), 1.0)?;
    ctx.begin_path();
    ctx.move_to(handles[1].x, handles[1].y);
    for corner in [handles[3], handles[5], handles[7]] {
        ctx.line_to(corner.x, corner.y);
    }
    ctx.close_path();
    ctx.stroke();
    set_dash(ctx, None, 1.0)?;

    // Rotate hotspot, tethered to the N handle.
    let rotate = hit::rotate_handle_position(b, rotate_offset_px);
    ctx.begin_path();
    ctx.move_to(handles[0].x, handles[0].y);
    ctx.line_to(rotate.x, rotate.y);
    ctx.stroke();
    ctx.begin_path();
    ctx.arc(rotate.x, rotate.y, HANDLE_RADIUS_PX, 0.0, TAU)?;
    ctx.set_fill_style_str("#fff");
    ctx.fill();
    ctx.stroke();

    for pos in &handles {
        let size = HANDLE_RADIUS_PX * 2.0;
        ctx.fill_rect(pos.x - HANDLE_RADIUS_PX, pos.y - HANDLE_RADIUS_PX, size, size);
        ctx.stroke_rect(pos.x - HANDLE_RADIUS_PX, pos.y - HANDLE_RADIUS_PX, size, size);
    }

    ctx.restore();
    Ok(())
}

// =============================================================
// Overlays and previews
// =============================================================

fn draw_overlays(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>, dpr: f64) -> Result<(), JsValue> {
    let projection = &scene.frame.projection;
    let image = projection.image();
    let zoom = projection.zoom();
    apply_camera(ctx, projection, scene.viewport, dpr)?;

    for &idx in &scene.frame.visibility.overlays {
        let Some(overlay) = scene.store.overlays().get(idx) else {
            continue;
        };
        let hovered = scene.ui.hovered_overlay.as_deref() == Some(overlay.id.as_str());
        let style = marker::overlay_style(overlay, hovered);
        let visual = primitive::render_shape(Some(&overlay.shape), &style, image.width, image.height, None);
        let at = projection.percentage_to_layer(Point::new(overlay.x, overlay.y));
        paint_visual(ctx, at, &visual, zoom)?;
        if let Some(label) = &overlay.label {
            draw_label(ctx, at, label, zoom)?;
        }
    }
    Ok(())
}

fn draw_preview(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>, dpr: f64) -> Result<(), JsValue> {
    let Some(preview) = &scene.frame.preview else {
        return Ok(());
    };
    let projection = &scene.frame.projection;
    let image = projection.image();
    let zoom = projection.zoom();
    apply_camera(ctx, projection, scene.viewport, dpr)?;

    match preview {
        DrawPreview::Sized { shape, center } => {
            let style = ShapeStyle { opacity: 0.6, dash: Some(PREVIEW_DASH_PX), ..ShapeStyle::default() };
            let visual = primitive::render_shape(Some(shape), &style, image.width, image.height, None);
            paint_visual(ctx, projection.percentage_to_layer(*center), &visual, zoom)
        }
        DrawPreview::Path { points, cursor } => draw_path_preview(ctx, projection, points, *cursor),
    }
}

fn draw_path_preview(
    ctx: &CanvasRenderingContext2d,
    projection: &Projection,
    points: &[Point],
    cursor: Option<Point>,
) -> Result<(), JsValue> {
    let zoom = projection.zoom();
    let layer: Vec<Point> = points.iter().map(|p| projection.percentage_to_layer(*p)).collect();
    let Some((first, rest)) = layer.split_first() else {
        return Ok(());
    };

    ctx.save();
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_line_width(2.0 / zoom);
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();

    // Dashed rubber band from the last point to the pointer.
    if let (Some(last), Some(cursor)) = (layer.last(), cursor) {
        let to = projection.percentage_to_layer(cursor);
        set_dash(ctx, Some(PREVIEW_DASH_PX), zoom)?;
        ctx.begin_path();
        ctx.move_to(last.x, last.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
        set_dash(ctx, None, zoom)?;
    }

    ctx.set_fill_style_str("#fff");
    for (i, p) in layer.iter().enumerate() {
        let r = if i == 0 { 5.0 } else { 3.0 } / zoom;
        ctx.begin_path();
        ctx.arc(p.x, p.y, r, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();
    }
    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: SelectionRect) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, Some([MARQUEE_DASH_PX, MARQUEE_DASH_PX]), 1.0)?;
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0);
    ctx.fill_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.stroke_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    set_dash(ctx, None, 1.0)?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Primitive painting
// =============================================================

/// Paint a resolved visual with its origin at `at` (layer pixels).
fn paint_visual(ctx: &CanvasRenderingContext2d, at: Point, visual: &ShapeVisual, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.translate(at.x, at.y)?;
    ctx.rotate(visual.rotation_deg.to_radians())?;
    ctx.set_global_alpha(visual.opacity);
    for item in &visual.items {
        paint_item(ctx, item, zoom)?;
    }
    ctx.restore();
    Ok(())
}

fn paint_item(ctx: &CanvasRenderingContext2d, item: &DrawItem, zoom: f64) -> Result<(), JsValue> {
    match &item.primitive {
        Primitive::Text { x, y, text, size } => {
            ctx.set_fill_style_str(item.paint.fill.as_deref().unwrap_or(LABEL_FILL));
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            ctx.set_font(&format!("bold {size:.2}px sans-serif"));
            return ctx.fill_text(text, *x, *y);
        }
        Primitive::Circle { cx, cy, r } => {
            ctx.begin_path();
            ctx.arc(*cx, *cy, *r, 0.0, TAU)?;
        }
        Primitive::Rect { x, y, width, height, corner_radius } => {
            rounded_rect_path(ctx, *x, *y, *width, *height, *corner_radius)?;
        }
        Primitive::Ellipse { cx, cy, rx, ry } => {
            if *rx <= 0.0 || *ry <= 0.0 {
                return Ok(());
            }
            ctx.begin_path();
            ctx.ellipse(*cx, *cy, *rx, *ry, 0.0, 0.0, TAU)?;
        }
        Primitive::Path { points, closed } => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            if *closed {
                ctx.close_path();
            }
        }
    }
    fill_and_stroke(ctx, &item.paint, zoom)
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, paint: &Paint, zoom: f64) -> Result<(), JsValue> {
    if let Some(fill) = &paint.fill {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    if let Some(stroke) = &paint.stroke {
        ctx.set_stroke_style_str(stroke);
        ctx.set_line_width(paint.stroke_width / zoom);
        set_dash(ctx, paint.dash, zoom)?;
        ctx.stroke();
        set_dash(ctx, None, zoom)?;
    }
    Ok(())
}

fn rounded_rect_path(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    radius: f64,
) -> Result<(), JsValue> {
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    ctx.begin_path();
    if r <= 0.0 {
        ctx.rect(x, y, w, h);
        return Ok(());
    }
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r)?;
    ctx.arc_to(x + w, y + h, x, y + h, r)?;
    ctx.arc_to(x, y + h, x, y, r)?;
    ctx.arc_to(x, y, x + w, y, r)?;
    ctx.close_path();
    Ok(())
}

fn draw_label(ctx: &CanvasRenderingContext2d, at: Point, text: &str, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(LABEL_FILL);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("{:.2}px sans-serif", LABEL_PX / zoom));
    ctx.fill_text(text, at.x, at.y)?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Map layer pixels to device pixels: `stage = (layer - center) * zoom + center + pan`, then `* dpr`.
fn apply_camera(
    ctx: &CanvasRenderingContext2d,
    projection: &Projection,
    viewport: (f64, f64),
    dpr: f64,
) -> Result<(), JsValue> {
    let camera = projection.camera();
    let zoom = projection.zoom();
    let (cx, cy) = (viewport.0 / 2.0, viewport.1 / 2.0);
    ctx.set_transform(
        dpr * zoom,
        0.0,
        0.0,
        dpr * zoom,
        dpr * (cx * (1.0 - zoom) + camera.pan_x),
        dpr * (cy * (1.0 - zoom) + camera.pan_y),
    )
}

/// Set a dash pattern given in screen pixels; `None` restores solid lines.
fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<[f64; 2]>, zoom: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    if let Some([on, off]) = dash {
        dash_array.push(&(on / zoom).into());
        dash_array.push(&(off / zoom).into());
    }
    ctx.set_line_dash(&dash_array)
}
