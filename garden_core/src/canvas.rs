// Canvas extent: the drawing surface's size and its growth rules.
//
// The canvas starts at the viewport size and only grows, never past the
// configured maxima. When a newly planted record's padded bounding box
// (`expand_margin` around the stem base and the crown) sticks out:
// - past the right or bottom edge, the canvas widens / lengthens to fit;
// - past the top edge, the canvas lengthens by `add_top` AND the whole
//   coordinate frame moves down by `add_top`: every stored plant's `y` and
//   every y-bearing field of its shape graph. This is the only operation in
//   the garden that mutates every plant as the side effect of one insertion.
//
// Once a dimension hits its maximum, later plants are simply drawn partly
// off-canvas; clamping is not an error.
//
// Explicit viewport resizes (`resize_viewport`) are the one way the size can
// shrink; they are clamped to the maxima as well, so the extent never
// exceeds them.
//
// See also: `garden.rs` for `shift_all_y`, `session.rs` which calls
// `maybe_expand()` after each local insertion.

use crate::config::CanvasConfig;
use crate::garden::GardenState;
use crate::plant::PlantRecord;

/// Current drawing-surface size, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasExtent {
    pub width: f64,
    pub height: f64,
    max_width: f64,
    max_height: f64,
}

/// What an expansion did, for the host to resize its surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expansion {
    pub width: f64,
    pub height: f64,
    /// How far every plant was moved down (0 when only right/bottom grew).
    pub shifted_by: f64,
}

/// Padded bounding box of a plant, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantBounds {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlantBounds {
    pub fn of(plant: &PlantRecord, margin: f64) -> Self {
        Self {
            top: plant.y - plant.height - margin,
            right: plant.x + margin,
            bottom: plant.y + margin,
        }
    }
}

impl CanvasExtent {
    /// A canvas at the given viewport size, clamped to the maxima.
    pub fn new(width: f64, height: f64, config: &CanvasConfig) -> Self {
        let mut extent = Self {
            width: 0.0,
            height: 0.0,
            max_width: config.max_width,
            max_height: config.max_height,
        };
        extent.resize_viewport(width, height);
        extent
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// External viewport resize. Non-finite or negative sizes become 0.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        let sane = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.width = sane(width).min(self.max_width).ceil();
        self.height = sane(height).min(self.max_height).ceil();
    }

    /// Grow the canvas (and shift the garden down) so a plant with the given
    /// padded bounds fits. Returns `None` when nothing had to change.
    pub fn maybe_expand(
        &mut self,
        bounds: PlantBounds,
        garden: &mut GardenState,
    ) -> Option<Expansion> {
        let add_top = if bounds.top < 0.0 { -bounds.top } else { 0.0 };

        let need_width = bounds.right > self.width;
        let future_bottom = bounds.bottom + add_top;
        let need_height = future_bottom > self.height;

        if !need_width && !need_height && add_top == 0.0 {
            return None;
        }

        let new_width = if need_width { bounds.right } else { self.width };
        let new_height = (self.height + add_top).max(future_bottom);

        if add_top > 0.0 {
            garden.shift_all_y(add_top);
        }

        let width = new_width.min(self.max_width).ceil().max(self.width);
        let height = new_height.min(self.max_height).ceil().max(self.height);
        if add_top == 0.0 && width == self.width && height == self.height {
            return None;
        }
        self.width = width;
        self.height = height;

        Some(Expansion {
            width: self.width,
            height: self.height,
            shifted_by: add_top,
        })
    }
}
