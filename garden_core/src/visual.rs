// Procedural plant geometry.
//
// Expands a `PlantRecord` into a `ShapeGraph`: one cubic Bézier stem and an
// ordered run of elliptical blobs, all placed by jitter drawn from the
// caller's `GardenRng`. Given the same record and the same PRNG state the
// output is identical, which is what the tests rely on; in a live session
// the PRNG stream keeps moving, so every plant looks different.
//
// Build order (paint order, later blobs over earlier ones):
//
//   1. Stem from the base `(x, y)` up to `(x ± 3, y - height)`, control
//      points at 35% and 70% of the height with ±10 / ±8 px of sway.
//   2. Crown: one large blob just above the stem tip. Sad plants get a
//      narrower crown (×0.8), joyful ones a wider one (×1.1).
//   3. Satellites: `complexity` blobs scattered around the top, one more for
//      joyful and angry plants, one fewer (but at least one) for sad ones.
//      Angry satellites are 10% wider.
//   4. Trail: a few small blobs hanging along the stem's vertical span.
//      Angry plants trail 3–6 blobs spread ±40 px, joyful 2–4 at ±25 px,
//      calm 1–3 at ±18 px, everything else 1–3 at ±25 px.
//
// Every blob gets a rotation in [-0.4, 0.4) rad, a color picked from the
// mood palette, and a 40% (35% for trail blobs) chance of a highlight wash.
//
// See also: `plant.rs` for the output types, `palette.rs` for colors,
// `render.rs` which paints the result.

use crate::palette;
use crate::plant::{Blob, PlantRecord, ShapeGraph, StemCurve};
use crate::types::{Mood, Point, Rgba};
use garden_prng::GardenRng;
use smallvec::SmallVec;

const MAX_ROTATION: f64 = 0.4;
const CROWN_HIGHLIGHT_CHANCE: f64 = 0.4;
const TRAIL_HIGHLIGHT_CHANCE: f64 = 0.35;

/// Build the shape graph for a plant. Pure apart from the PRNG draws.
pub fn build(plant: &PlantRecord, rng: &mut GardenRng) -> ShapeGraph {
    let (x, y, height, mood) = (plant.x, plant.y, plant.height, plant.mood);
    let top_y = y - height;
    let palette = palette::foliage(mood);

    // --- Stem ---
    let stem = StemCurve {
        start: Point::new(x, y),
        c1: Point::new(x + rng.range_f64(-10.0, 10.0), y - height * 0.35),
        c2: Point::new(x + rng.range_f64(-8.0, 8.0), y - height * 0.7),
        end: Point::new(x + rng.range_f64(-3.0, 3.0), top_y),
    };

    let mut blobs = SmallVec::new();

    // --- Crown ---
    let crown_scale = match mood {
        Mood::Sad => 0.8,
        Mood::Joyful => 1.1,
        _ => 1.0,
    };
    let bx = stem.end.x + rng.range_f64(-6.0, 6.0);
    let by = top_y - rng.range_f64(0.0, 16.0);
    let rx = rng.range_f64(40.0, 80.0) * crown_scale / 2.0;
    let ry = rng.range_f64(26.0, 50.0) / 2.0;
    blobs.push(finish_blob(bx, by, rx, ry, palette, CROWN_HIGHLIGHT_CHANCE, rng));

    // --- Satellites ---
    let satellite_scale = if mood == Mood::Angry { 1.1 } else { 1.0 };
    for _ in 0..satellite_count(plant.complexity, mood) {
        let bx = x + rng.range_f64(-26.0, 22.0);
        let by = top_y + rng.range_f64(-18.0, 30.0);
        let rx = rng.range_f64(20.0, 55.0) * satellite_scale / 2.0;
        let ry = rng.range_f64(14.0, 32.0) / 2.0;
        blobs.push(finish_blob(bx, by, rx, ry, palette, CROWN_HIGHLIGHT_CHANCE, rng));
    }

    // --- Trail along the stem ---
    let (low, high) = trail_count_range(mood);
    let trail_count = rng.range_usize_inclusive(low, high);
    let spread = trail_spread(mood);
    for _ in 0..trail_count {
        let t = rng.next_f64();
        let along = y - height * t;
        let bx = x + rng.range_f64(-spread, spread);
        let by = along + rng.range_f64(-10.0, 10.0);
        let rx = rng.range_f64(10.0, 26.0) / 2.0;
        let ry = rng.range_f64(8.0, 20.0) / 2.0;
        blobs.push(finish_blob(bx, by, rx, ry, palette, TRAIL_HIGHLIGHT_CHANCE, rng));
    }

    ShapeGraph { stem, blobs }
}

/// Attach a shape graph to the plant unless it already has one.
pub fn ensure_visual(plant: &mut PlantRecord, rng: &mut GardenRng) {
    if plant.visual.is_none() {
        plant.visual = Some(build(plant, rng));
    }
}

/// Satellite blob count for a complexity level and mood.
pub fn satellite_count(complexity: u8, mood: Mood) -> usize {
    let base = complexity as usize;
    match mood {
        Mood::Joyful | Mood::Angry => base + 1,
        Mood::Sad => base.saturating_sub(1).max(1),
        Mood::Calm | Mood::Neutral => base,
    }
}

/// Inclusive bounds on the number of trailing blobs.
pub fn trail_count_range(mood: Mood) -> (usize, usize) {
    match mood {
        Mood::Angry => (3, 6),
        Mood::Joyful => (2, 4),
        Mood::Calm | Mood::Sad | Mood::Neutral => (1, 3),
    }
}

/// Horizontal scatter of trailing blobs around the stem.
pub fn trail_spread(mood: Mood) -> f64 {
    match mood {
        Mood::Angry => 40.0,
        Mood::Calm => 18.0,
        Mood::Joyful | Mood::Sad | Mood::Neutral => 25.0,
    }
}

/// Roll rotation, color and highlight for a placed blob.
fn finish_blob(
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    palette: &[Rgba],
    highlight_chance: f64,
    rng: &mut GardenRng,
) -> Blob {
    let rotation = rng.range_f64(-MAX_ROTATION, MAX_ROTATION);
    let color = rng
        .pick(palette)
        .copied()
        .unwrap_or(Rgba::new(194, 212, 243, 0.7));
    let highlight = rng.random_bool(highlight_chance);
    Blob {
        x,
        y,
        rx,
        ry,
        rotation,
        color,
        highlight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::{MAX_BLOBS, PlantOrigin};
    use crate::types::PlantId;

    fn plant(mood: Mood, complexity: u8) -> PlantRecord {
        PlantRecord {
            id: PlantId::from_remote("p_visual").unwrap(),
            x: 500.0,
            y: 600.0,
            height: 200.0,
            complexity,
            text: String::new(),
            confidence: 0.8,
            mood,
            energy: 0.4,
            alpha: 1.0,
            drift_x: 0.0,
            drift_y: 0.0,
            origin: PlantOrigin::Speech,
            visual: None,
        }
    }

    #[test]
    fn same_seed_same_shape() {
        let p = plant(Mood::Joyful, 3);
        let a = build(&p, &mut GardenRng::new(42));
        let b = build(&p, &mut GardenRng::new(42));
        assert_eq!(a, b);
        let c = build(&p, &mut GardenRng::new(43));
        assert_ne!(a, c);
    }

    #[test]
    fn stem_runs_from_base_to_top() {
        let p = plant(Mood::Neutral, 2);
        let mut rng = GardenRng::new(7);
        for _ in 0..200 {
            let g = build(&p, &mut rng);
            assert_eq!(g.stem.start, Point::new(500.0, 600.0));
            assert_eq!(g.stem.end.y, 400.0);
            assert!((g.stem.end.x - 500.0).abs() <= 3.0);
            assert!((g.stem.c1.y - 530.0).abs() < 1e-9);
            assert!((g.stem.c2.y - 460.0).abs() < 1e-9);
            assert!((g.stem.c1.x - 500.0).abs() <= 10.0);
            assert!((g.stem.c2.x - 500.0).abs() <= 8.0);
        }
    }

    #[test]
    fn blob_counts_follow_mood_rules() {
        let mut rng = GardenRng::new(99);
        for mood in Mood::ALL {
            for complexity in 1..=4u8 {
                let (low, high) = trail_count_range(mood);
                let satellites = satellite_count(complexity, mood);
                for _ in 0..50 {
                    let g = build(&plant(mood, complexity), &mut rng);
                    let n = g.blobs.len();
                    assert!(
                        n >= 1 + satellites + low && n <= 1 + satellites + high,
                        "{mood} c{complexity}: {n} blobs"
                    );
                    assert!(n <= MAX_BLOBS);
                }
            }
        }
        assert_eq!(satellite_count(1, Mood::Sad), 1);
        assert_eq!(satellite_count(3, Mood::Sad), 2);
        assert_eq!(satellite_count(4, Mood::Angry), 5);
    }

    #[test]
    fn blobs_use_mood_palette_and_bounded_rotation() {
        let mut rng = GardenRng::new(5);
        for mood in Mood::ALL {
            let g = build(&plant(mood, 4), &mut rng);
            for blob in &g.blobs {
                assert!(palette::foliage(mood).contains(&blob.color));
                assert!(blob.rotation >= -0.4 && blob.rotation < 0.4);
                assert!(blob.rx > 0.0 && blob.ry > 0.0);
            }
        }
    }

    #[test]
    fn trail_stays_near_stem() {
        let mut rng = GardenRng::new(8);
        let p = plant(Mood::Angry, 1);
        for _ in 0..100 {
            let g = build(&p, &mut rng);
            let satellites = satellite_count(1, Mood::Angry);
            for blob in g.blobs.iter().skip(1 + satellites) {
                assert!((blob.x - 500.0).abs() <= 40.0);
                assert!(blob.y <= 610.0 && blob.y >= 390.0, "trail y {}", blob.y);
            }
        }
    }

    #[test]
    fn ensure_visual_builds_once() {
        let mut p = plant(Mood::Calm, 2);
        let mut rng = GardenRng::new(1);
        ensure_visual(&mut p, &mut rng);
        let first = p.visual.clone();
        ensure_visual(&mut p, &mut rng);
        assert_eq!(p.visual, first);
    }

    #[test]
    fn highlights_appear_roughly_two_in_five() {
        let mut rng = GardenRng::new(2024);
        let (mut lit, mut total) = (0usize, 0usize);
        for _ in 0..2_000 {
            let g = build(&plant(Mood::Neutral, 2), &mut rng);
            total += g.blobs.len();
            lit += g.blobs.iter().filter(|b| b.highlight).count();
        }
        let share = lit as f64 / total as f64;
        assert!((0.33..0.43).contains(&share), "highlight share {share}");
    }
}
