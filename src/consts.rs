//! Shared numeric constants for the canvas crate.
//!
//! Tunable thresholds live in [`crate::config::CanvasConfig`]; the values here
//! are fixed properties of the design surface and the shape catalogue.

// ── Design surface ──────────────────────────────────────────────

/// Upper bound of the percentage coordinate space on either axis.
pub const SURFACE_MAX_PCT: f64 = 100.0;

/// Content aspect ratio used when no background image is present (4:3).
pub const FALLBACK_ASPECT_RATIO: f64 = 4.0 / 3.0;

// ── Shape sizing (percent units) ────────────────────────────────

/// Radius of the implicit circle drawn for a marker without a shape.
pub const DEFAULT_CIRCLE_RADIUS_PCT: f64 = 0.8;

/// Smallest radius/width/height any resizable shape may collapse to.
pub const MIN_SHAPE_SIZE_PCT: f64 = 0.1;

/// Minimum STAGE width and height.
pub const STAGE_MIN_WIDTH_PCT: f64 = 5.0;
pub const STAGE_MIN_HEIGHT_PCT: f64 = 3.0;

/// Minimum SOFA width and height.
pub const SOFA_MIN_WIDTH_PCT: f64 = 2.0;
pub const SOFA_MIN_HEIGHT_PCT: f64 = 1.5;

/// Vertex count of a POLYGON created by drag-to-size.
pub const DRAWN_POLYGON_SIDES: u32 = 6;

/// Fewest points a POLYGON may carry.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Fewest points that close a FREEFORM path.
pub const MIN_FREEFORM_POINTS: usize = 2;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for transform handles.
pub const HANDLE_RADIUS_PX: f64 = 6.0;

/// Smallest screen-space hit radius of a marker, so tiny seats stay clickable.
pub const MIN_MARKER_HIT_RADIUS_PX: f64 = 8.0;

/// Radius of the plain dot drawn in low-detail mode, in screen pixels.
pub const LOW_DETAIL_DOT_RADIUS_PX: f64 = 2.5;

// ── Rendering ───────────────────────────────────────────────────

/// Dash pattern (on, off) for placement previews, in screen pixels.
pub const PREVIEW_DASH_PX: [f64; 2] = [6.0, 4.0];

/// Dash segment length for the marquee rectangle, in screen pixels.
pub const MARQUEE_DASH_PX: f64 = 4.0;

/// Position rounding used by raster cache keys (percent units).
pub const CACHE_POSITION_STEP_PCT: f64 = 0.01;

/// Raster scale quantization step; a bitmap is redrawn when zoom times dpr moves by more.
pub const CACHE_SCALE_STEP: f64 = 0.01;

/// Largest side of a cached marker bitmap in device pixels; bigger markers are downsampled.
pub const MAX_RASTER_SIDE_PX: f64 = 2048.0;
