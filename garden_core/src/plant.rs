// Plant records and their shape graphs.
//
// A `PlantRecord` is one utterance made visible: where its stem is rooted,
// how tall and bushy it is, the mood it was spoken in, and the mutable
// weather state (`alpha`, `drift_x`, `drift_y`) that evolves per frame.
//
// A `ShapeGraph` is the record's drawable geometry: one cubic Bézier stem and
// an ordered list of elliptical blobs (later blobs paint over earlier ones).
// It is built once by `visual.rs` and attached to the record; afterwards only
// whole-frame translations (`shift_y`, applied when the canvas grows upward)
// ever touch it. Redrawing never regenerates blobs, so plants do not flicker
// and look the same on every client that received the same record.
//
// See also: `plant_gen.rs` which creates records, `visual.rs` which builds
// the shape graph, `garden.rs` which stores them.

use crate::types::{Mood, PlantId, Point, Rgba};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Upper bound on blobs per plant: 1 crown + up to 5 satellites + up to 6
/// trailing blobs.
pub const MAX_BLOBS: usize = 12;

/// The stem: a cubic Bézier from the plant's base to its top.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StemCurve {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl StemCurve {
    /// The same curve displaced by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            start: self.start.offset(dx, dy),
            c1: self.c1.offset(dx, dy),
            c2: self.c2.offset(dx, dy),
            end: self.end.offset(dx, dy),
        }
    }
}

/// One filled, rotated ellipse of foliage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
    /// Rotation in radians, within [-0.4, 0.4].
    pub rotation: f64,
    pub color: Rgba,
    /// Paint a white wash over the upper-left of the blob.
    pub highlight: bool,
}

/// Drawable geometry of a plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeGraph {
    pub stem: StemCurve,
    pub blobs: SmallVec<[Blob; MAX_BLOBS]>,
}

impl ShapeGraph {
    /// Translate every y-bearing field by `dy`.
    pub fn shift_y(&mut self, dy: f64) {
        self.stem = self.stem.offset(0.0, dy);
        for blob in &mut self.blobs {
            blob.y += dy;
        }
    }
}

/// Where a plant came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantOrigin {
    /// Heard by this client's recognizer.
    Speech,
    /// Synthesized by the idle-sprout timer.
    Idle,
    /// Merged from the shared remote garden.
    Remote,
}

/// One plant: parameters, weather state, and (once built) its geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: PlantId,
    /// Stem base, in canvas pixels.
    pub x: f64,
    pub y: f64,
    /// Stem length in pixels.
    pub height: f64,
    /// 1..=4; drives the satellite blob count.
    pub complexity: u8,
    pub text: String,
    pub confidence: f64,
    pub mood: Mood,
    pub energy: f64,
    /// Opacity. Starts at 1, only weather lowers it, never below 0.
    pub alpha: f64,
    pub drift_x: f64,
    pub drift_y: f64,
    pub origin: PlantOrigin,
    pub visual: Option<ShapeGraph>,
}

impl PlantRecord {
    /// Translate the plant (base point and geometry) down by `dy`.
    pub fn shift_y(&mut self, dy: f64) {
        self.y += dy;
        if let Some(visual) = &mut self.visual {
            visual.shift_y(dy);
        }
    }

    /// Lower alpha by `amount`, flooring at 0.
    pub fn fade(&mut self, amount: f64) {
        self.alpha = (self.alpha - amount).max(0.0);
    }

    /// Whether the plant should still be drawn.
    pub fn is_visible(&self, min_alpha: f64) -> bool {
        self.alpha > min_alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlantRecord {
        PlantRecord {
            id: PlantId::from_remote("p_test").unwrap(),
            x: 100.0,
            y: 400.0,
            height: 150.0,
            complexity: 2,
            text: "hello".into(),
            confidence: 0.9,
            mood: Mood::Neutral,
            energy: 0.4,
            alpha: 1.0,
            drift_x: 0.0,
            drift_y: 0.0,
            origin: PlantOrigin::Speech,
            visual: Some(ShapeGraph {
                stem: StemCurve {
                    start: Point::new(100.0, 400.0),
                    c1: Point::new(104.0, 347.5),
                    c2: Point::new(97.0, 295.0),
                    end: Point::new(101.0, 250.0),
                },
                blobs: SmallVec::from_vec(vec![Blob {
                    x: 101.0,
                    y: 245.0,
                    rx: 25.0,
                    ry: 15.0,
                    rotation: 0.1,
                    color: Rgba::new(1, 2, 3, 0.5),
                    highlight: false,
                }]),
            }),
        }
    }

    #[test]
    fn shift_moves_every_y_field_and_no_x_field() {
        let mut plant = sample();
        let before = plant.clone();
        plant.shift_y(30.0);

        assert_eq!(plant.y, before.y + 30.0);
        assert_eq!(plant.x, before.x);
        let (a, b) = (plant.visual.unwrap(), before.visual.unwrap());
        assert_eq!(a.stem.start.y, b.stem.start.y + 30.0);
        assert_eq!(a.stem.c1.y, b.stem.c1.y + 30.0);
        assert_eq!(a.stem.c2.y, b.stem.c2.y + 30.0);
        assert_eq!(a.stem.end.y, b.stem.end.y + 30.0);
        assert_eq!(a.stem.c1.x, b.stem.c1.x);
        assert_eq!(a.blobs[0].y, b.blobs[0].y + 30.0);
        assert_eq!(a.blobs[0].x, b.blobs[0].x);
    }

    #[test]
    fn fade_floors_at_zero() {
        let mut plant = sample();
        plant.fade(0.7);
        assert!((plant.alpha - 0.3).abs() < 1e-12);
        plant.fade(0.7);
        assert_eq!(plant.alpha, 0.0);
        assert!(!plant.is_visible(0.01));
    }
}
