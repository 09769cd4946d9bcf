// Frame rendering through an abstract drawing surface.
//
// The garden draws with four primitives, modeled on an HTML canvas 2D
// context: resize, fill the background, stroke a cubic Bézier, fill a
// rotated ellipse. Hosts implement `Surface` for whatever they paint on;
// `DrawList` records the calls (for tests and for hosts that replay them
// later) and `svg::SvgSurface` turns them into an SVG document.
//
// Paint order per frame: background, then plants oldest first. Each visible
// plant paints its stem (2 px, mood stem color) and then its blobs in order.
// A highlighted blob gets a small white wash over its upper-left quadrant,
// placed in the blob's rotated frame so it turns with the blob. The plant's
// current drift offsets every point; its alpha multiplies every color.
// Plants at or below the visibility threshold are skipped entirely.
//
// See also: `plant.rs` for `ShapeGraph`, `palette.rs` for the colors,
// `session.rs` which calls `render_garden()` once per frame.

use crate::garden::GardenState;
use crate::palette;
use crate::plant::{PlantRecord, StemCurve};
use crate::types::{Point, Rgba};

pub const STEM_WIDTH: f64 = 2.0;
/// Highlight wash offset from the blob center, as a fraction of the radii.
pub const HIGHLIGHT_OFFSET: f64 = 0.25;
/// Highlight wash radii, as a fraction of the blob radii.
pub const HIGHLIGHT_SCALE: f64 = 0.55;

/// Something the garden can paint on.
pub trait Surface {
    /// Match the canvas size. Called at the start of every frame.
    fn resize(&mut self, width: f64, height: f64);

    fn fill_background(&mut self, color: Rgba);

    fn stroke_curve(&mut self, curve: &StemCurve, width: f64, color: Rgba, alpha: f64);

    /// Fill an ellipse centered on `center`, rotated by `rotation` radians.
    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation: f64, color: Rgba, alpha: f64);
}

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Resize {
        width: f64,
        height: f64,
    },
    Background(Rgba),
    Curve {
        curve: StemCurve,
        width: f64,
        color: Rgba,
        alpha: f64,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        rotation: f64,
        color: Rgba,
        alpha: f64,
    },
}

/// A surface that just remembers what it was asked to draw.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn curves(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Curve { .. }))
    }

    pub fn ellipses(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Ellipse { .. }))
    }
}

impl Surface for DrawList {
    fn resize(&mut self, width: f64, height: f64) {
        self.ops.push(DrawOp::Resize { width, height });
    }

    fn fill_background(&mut self, color: Rgba) {
        self.ops.push(DrawOp::Background(color));
    }

    fn stroke_curve(&mut self, curve: &StemCurve, width: f64, color: Rgba, alpha: f64) {
        self.ops.push(DrawOp::Curve {
            curve: *curve,
            width,
            color,
            alpha,
        });
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation: f64, color: Rgba, alpha: f64) {
        self.ops.push(DrawOp::Ellipse {
            center,
            rx,
            ry,
            rotation,
            color,
            alpha,
        });
    }
}

/// Paint the whole garden: background, then every visible plant.
pub fn render_garden(
    garden: &GardenState,
    width: f64,
    height: f64,
    background: Rgba,
    min_alpha: f64,
    surface: &mut dyn Surface,
) {
    surface.resize(width, height);
    surface.fill_background(background);
    for plant in garden.iter() {
        if plant.is_visible(min_alpha) {
            draw_plant(plant, surface);
        }
    }
}

/// Paint one plant. Plants without geometry are skipped.
pub fn draw_plant(plant: &PlantRecord, surface: &mut dyn Surface) {
    let Some(visual) = &plant.visual else {
        return;
    };
    let (dx, dy) = (plant.drift_x, plant.drift_y);
    let alpha = plant.alpha;

    let stem = visual.stem.offset(dx, dy);
    surface.stroke_curve(&stem, STEM_WIDTH, palette::stem(plant.mood), alpha);

    for blob in &visual.blobs {
        let center = Point::new(blob.x + dx, blob.y + dy);
        surface.fill_ellipse(center, blob.rx, blob.ry, blob.rotation, blob.color, alpha);
        if blob.highlight {
            let wash = highlight_center(center, blob.rx, blob.ry, blob.rotation);
            surface.fill_ellipse(
                wash,
                blob.rx * HIGHLIGHT_SCALE,
                blob.ry * HIGHLIGHT_SCALE,
                blob.rotation,
                palette::HIGHLIGHT,
                alpha,
            );
        }
    }
}

/// Center of a blob's highlight: `(-0.25 rx, -0.25 ry)` in the blob's
/// rotated frame.
pub fn highlight_center(center: Point, rx: f64, ry: f64, rotation: f64) -> Point {
    let (lx, ly) = (-rx * HIGHLIGHT_OFFSET, -ry * HIGHLIGHT_OFFSET);
    let (sin, cos) = rotation.sin_cos();
    Point::new(center.x + lx * cos - ly * sin, center.y + lx * sin + ly * cos)
}
