//! Draw layers and dirty tracking.
//!
//! The canvas is painted as five stacked layers, each with its own backing
//! canvas. A change only marks the layers it affects; a frame repaints the
//! dirty layers and composites all five in order.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

/// A paint layer, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Background image, loading placeholder, grid.
    Background,
    /// Markers that are neither selected, hovered nor moving.
    Static,
    /// Selected, hovered or dragged markers and transform handles.
    Interactive,
    /// Shape overlays and draw previews.
    Overlay,
    Marquee,
}

impl Layer {
    pub const ALL: [Layer; 5] = [Self::Background, Self::Static, Self::Interactive, Self::Overlay, Self::Marquee];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Layer a marker is painted on.
#[must_use]
pub fn marker_layer(selected: bool, hovered: bool, moving: bool) -> Layer {
    if selected || hovered || moving { Layer::Interactive } else { Layer::Static }
}

/// Set of layers needing a repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyLayers {
    bits: u8,
}

impl Default for DirtyLayers {
    /// Everything starts dirty so the first frame paints in full.
    fn default() -> Self {
        Self::all()
    }
}

impl DirtyLayers {
    #[must_use]
    pub fn all() -> Self {
        Self { bits: Layer::ALL.iter().fold(0, |acc, l| acc | l.bit()) }
    }

    #[must_use]
    pub fn none() -> Self {
        Self { bits: 0 }
    }

    pub fn mark(&mut self, layer: Layer) {
        self.bits |= layer.bit();
    }

    pub fn mark_all(&mut self) {
        *self = Self::all();
    }

    #[must_use]
    pub fn is_dirty(&self, layer: Layer) -> bool {
        self.bits & layer.bit() != 0
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.bits == 0
    }

    /// Lowest dirty layer.
    #[must_use]
    pub fn lowest(&self) -> Option<Layer> {
        Layer::ALL.into_iter().find(|l| self.is_dirty(*l))
    }

    /// Dirty layers, bottom to top, clearing the set.
    pub fn take(&mut self) -> Vec<Layer> {
        let dirty = Layer::ALL.into_iter().filter(|l| self.is_dirty(*l)).collect();
        *self = Self::none();
        dirty
    }
}
