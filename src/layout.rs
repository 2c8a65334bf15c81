//! Letterbox fitting and percentage ⇄ stage projection.
//!
//! The design surface is a 0–100 grid on both axes. It is mapped onto the
//! displayed image rectangle (`ImageRect`) inside the container, and the
//! layer holding that rectangle is then panned/zoomed by the [`Camera`].

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::SURFACE_MAX_PCT;

/// The displayed image rectangle inside the container, in layer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ImageRect {
    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// The smaller of width and height.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Fit content of `aspect` (width / height) inside a container, centered, without cropping.
#[must_use]
pub fn fit_contain(container_w: f64, container_h: f64, aspect: f64) -> ImageRect {
    if container_w <= 0.0 || container_h <= 0.0 || aspect <= 0.0 {
        return ImageRect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
    }
    let container_aspect = container_w / container_h;
    let (width, height) = if container_aspect > aspect {
        (container_h * aspect, container_h)
    } else {
        (container_w, container_w / aspect)
    };
    ImageRect { x: (container_w - width) / 2.0, y: (container_h - height) / 2.0, width, height }
}

/// Resolves the image rectangle each frame, locking the container size when
/// there is no image so markers do not drift as the window resizes.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLayout {
    locked: Option<(f64, f64)>,
}

impl SurfaceLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The locked container size, if any.
    #[must_use]
    pub fn locked_size(&self) -> Option<(f64, f64)> {
        self.locked
    }

    /// Compute the image rectangle for this frame.
    ///
    /// `image_size` is the natural size of the loaded background image, if any.
    /// Returns `None` until a usable container size is known.
    pub fn resolve(
        &mut self,
        container_w: f64,
        container_h: f64,
        image_size: Option<(f64, f64)>,
        fallback_aspect: f64,
    ) -> Option<ImageRect> {
        if let Some((w, h)) = image_size.filter(|(w, h)| *w > 0.0 && *h > 0.0) {
            self.locked = None;
            let rect = fit_contain(container_w, container_h, w / h);
            return rect.is_valid().then_some(rect);
        }

        if self.locked.is_none() && container_w > 0.0 && container_h > 0.0 {
            self.locked = Some((container_w, container_h));
        }
        let (w, h) = self.locked?;
        let rect = fit_contain(w, h, fallback_aspect);
        rect.is_valid().then_some(rect)
    }
}

/// Conversions between percentage, layer, and stage space for one frame.
///
/// Only constructed with a valid image rectangle, so none of the conversions
/// divide by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    image: ImageRect,
    camera: Camera,
    center: Point,
}

impl Projection {
    /// Build a projection. `viewport_w`/`viewport_h` are the stage size in pixels.
    #[must_use]
    pub fn new(image: ImageRect, camera: Camera, viewport_w: f64, viewport_h: f64) -> Option<Self> {
        if !image.is_valid() {
            return None;
        }
        Some(Self { image, camera, center: Point::new(viewport_w / 2.0, viewport_h / 2.0) })
    }

    #[must_use]
    pub fn image(&self) -> ImageRect {
        self.image
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Zoom factor between layer and stage pixels.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.camera.effective_zoom()
    }

    /// Percentage point to layer pixels (image offset and scale only).
    #[must_use]
    pub fn percentage_to_layer(&self, pct: Point) -> Point {
        Point {
            x: self.image.x + pct.x * self.image.width / SURFACE_MAX_PCT,
            y: self.image.y + pct.y * self.image.height / SURFACE_MAX_PCT,
        }
    }

    /// Percentage point to stage pixels.
    #[must_use]
    pub fn percentage_to_stage(&self, pct: Point) -> Point {
        self.camera.layer_to_stage(self.percentage_to_layer(pct), self.center)
    }

    /// Layer pixels back to percentage; the layer's own pan/zoom is assumed already removed.
    #[must_use]
    pub fn layer_to_percentage(&self, layer: Point) -> Point {
        Point {
            x: (layer.x - self.image.x) / self.image.width * SURFACE_MAX_PCT,
            y: (layer.y - self.image.y) / self.image.height * SURFACE_MAX_PCT,
        }
    }

    /// Stage pixels back to percentage (full inverse).
    #[must_use]
    pub fn stage_to_percentage(&self, stage: Point) -> Point {
        self.layer_to_percentage(self.camera.stage_to_layer(stage, self.center))
    }

    /// Stage-space pointer position to percentage, for draw tools.
    #[must_use]
    pub fn pointer_to_percentage(&self, pointer: Point) -> Point {
        self.stage_to_percentage(pointer)
    }

    /// Layer pixels spanned by `pct` percent of the surface width.
    #[must_use]
    pub fn width_pct_to_px(&self, pct: f64) -> f64 {
        pct * self.image.width / SURFACE_MAX_PCT
    }

    /// Layer pixels spanned by `pct` percent of the surface height.
    #[must_use]
    pub fn height_pct_to_px(&self, pct: f64) -> f64 {
        pct * self.image.height / SURFACE_MAX_PCT
    }

    /// Layer pixels spanned by `pct` percent of the smaller surface side.
    #[must_use]
    pub fn min_pct_to_px(&self, pct: f64) -> f64 {
        pct * self.image.min_side() / SURFACE_MAX_PCT
    }

    /// Layer pixels to stage pixels (scale only).
    #[must_use]
    pub fn layer_len_to_stage(&self, len: f64) -> f64 {
        len * self.zoom()
    }
}
