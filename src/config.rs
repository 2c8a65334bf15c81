//! Tunable engine thresholds.
//!
//! The host may pass a JSON object with any subset of these fields; missing
//! fields keep their defaults. Values are validated once at load time so the
//! rest of the engine can rely on them being finite and in range.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_ASPECT_RATIO;
use crate::error::ConfigError;

pub const DEFAULT_VIRTUALIZE_THRESHOLD: usize = 40;
pub const DEFAULT_HOVER_ANIMATION_THRESHOLD: usize = 100;
pub const DEFAULT_LOW_DETAIL_ZOOM: f64 = 0.4;
pub const DEFAULT_VIEWPORT_PADDING: f64 = 0.2;
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 3.0;
pub const DEFAULT_MIN_DRAW_DISTANCE_PCT: f64 = 0.3;
pub const DEFAULT_FREEFORM_POINT_SPACING_PCT: f64 = 0.1;
pub const DEFAULT_FREEFORM_CLOSE_DISTANCE_PCT: f64 = 1.5;
pub const DEFAULT_ROTATE_HOTSPOT_OFFSET_PX: f64 = 25.0;

/// How a batch drag keeps members inside the design surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchClamp {
    /// Each member is clamped to `[0, 100]` on its own; spacing may compress at the edges.
    #[default]
    PerMember,
    /// The shared delta is limited so every member stays in range; spacing is preserved.
    Rigid,
}

/// Engine-wide thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Above this many markers + overlays, off-screen items are culled.
    pub virtualize_threshold: usize,
    /// Above this many visible items, hover animation is disabled.
    pub hover_animation_threshold: usize,
    /// Below this zoom level markers render as plain dots.
    pub low_detail_zoom: f64,
    /// Extra margin around the viewport kept during culling, as a fraction of its size.
    pub viewport_padding: f64,
    /// Pointer travel in screen pixels before a press on a marker becomes a drag.
    pub drag_threshold_px: f64,
    /// Drag-to-size gestures shorter than this (percent) are treated as clicks.
    pub min_draw_distance: f64,
    /// Freeform clicks closer than this (percent) to the last point are dropped.
    pub freeform_point_spacing: f64,
    /// Freeform clicks within this distance (percent) of the first point close the path.
    pub freeform_close_distance: f64,
    /// Distance of the rotate hotspot above the bounding box, in screen pixels.
    pub rotate_hotspot_offset_px: f64,
    /// Content aspect ratio (width / height) used without a background image.
    pub fallback_aspect_ratio: f64,
    /// Boundary handling for batch drags.
    pub batch_clamp: BatchClamp,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            virtualize_threshold: DEFAULT_VIRTUALIZE_THRESHOLD,
            hover_animation_threshold: DEFAULT_HOVER_ANIMATION_THRESHOLD,
            low_detail_zoom: DEFAULT_LOW_DETAIL_ZOOM,
            viewport_padding: DEFAULT_VIEWPORT_PADDING,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            min_draw_distance: DEFAULT_MIN_DRAW_DISTANCE_PCT,
            freeform_point_spacing: DEFAULT_FREEFORM_POINT_SPACING_PCT,
            freeform_close_distance: DEFAULT_FREEFORM_CLOSE_DISTANCE_PCT,
            rotate_hotspot_offset_px: DEFAULT_ROTATE_HOTSPOT_OFFSET_PX,
            fallback_aspect_ratio: FALLBACK_ASPECT_RATIO,
            batch_clamp: BatchClamp::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse a config object supplied by the host and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::OutOfRange`] when a numeric field is negative, non-finite,
    /// or (for ratios and zoom) not strictly positive.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first rejected field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("viewportPadding", self.viewport_padding)?;
        non_negative("dragThresholdPx", self.drag_threshold_px)?;
        non_negative("minDrawDistance", self.min_draw_distance)?;
        non_negative("freeformPointSpacing", self.freeform_point_spacing)?;
        non_negative("freeformCloseDistance", self.freeform_close_distance)?;
        non_negative("rotateHotspotOffsetPx", self.rotate_hotspot_offset_px)?;
        positive("lowDetailZoom", self.low_detail_zoom)?;
        positive("fallbackAspectRatio", self.fallback_aspect_ratio)?;
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}
