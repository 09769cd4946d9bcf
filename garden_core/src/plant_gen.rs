// Speech-to-plant parameter generation.
//
// Turns one utterance (text + recognizer confidence) into a `PlantRecord`
// with no geometry yet:
// - word count: whitespace-split tokens, empties dropped;
// - height: `base + min(words, 20) * 7`, then the mood's multiplier
//   (sad 0.8, calm 0.9, joyful/angry 1.05, neutral 1.0);
// - complexity: `min(1 + words / 4, 4)`;
// - position: uniform inside the canvas inset by the spawn margin, with a
//   minimum span so tiny canvases still scatter plants;
// - mood/energy from `emotion::analyze`, fresh id, alpha 1, zero drift.
//
// Malformed input is never an error: empty text makes a short neutral
// plant, and a confidence outside [0, 1] is replaced by the default.
//
// See also: `visual.rs` which builds the geometry, `session.rs` which calls
// `generate()` for speech and idle sprouts.

use crate::canvas::CanvasExtent;
use crate::config::{CanvasConfig, GardenConfig, GrowthConfig};
use crate::emotion;
use crate::plant::{PlantOrigin, PlantRecord};
use crate::types::{Mood, PlantId};
use garden_prng::GardenRng;

/// Number of non-empty whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Stem height before the mood multiplier. Saturates at
/// `max_counted_words` words.
pub fn base_height(words: usize, growth: &GrowthConfig) -> f64 {
    growth.base_height + words.min(growth.max_counted_words) as f64 * growth.height_per_word
}

/// Stem height after the mood multiplier.
pub fn plant_height(words: usize, mood: Mood, growth: &GrowthConfig) -> f64 {
    base_height(words, growth) * mood.height_multiplier()
}

/// Complexity in `1..=max_complexity`, non-decreasing in word count.
pub fn complexity(words: usize, growth: &GrowthConfig) -> u8 {
    let raw = 1 + words / growth.words_per_complexity.max(1);
    raw.min(growth.max_complexity.max(1) as usize) as u8
}

/// Normalize a recognizer confidence; anything outside [0, 1] (including NaN)
/// becomes the configured default.
pub fn sanitize_confidence(confidence: f64, growth: &GrowthConfig) -> f64 {
    if (0.0..=1.0).contains(&confidence) {
        confidence
    } else {
        growth.default_confidence
    }
}

/// Uniform random stem base inside the canvas, inset by the spawn margin.
pub fn random_position(
    canvas: &CanvasExtent,
    config: &CanvasConfig,
    rng: &mut GardenRng,
) -> (f64, f64) {
    let margin = config.spawn_margin;
    let span_x = (canvas.width - margin * 2.0).max(config.min_spawn_span);
    let span_y = (canvas.height - margin * 2.0).max(config.min_spawn_span);
    let x = margin + rng.next_f64() * span_x;
    let y = margin + rng.next_f64() * span_y;
    (x, y)
}

/// Build a plant record (without geometry) from one utterance.
pub fn generate(
    text: &str,
    confidence: f64,
    origin: PlantOrigin,
    canvas: &CanvasExtent,
    config: &GardenConfig,
    rng: &mut GardenRng,
    now_ms: u64,
) -> PlantRecord {
    let text = text.trim();
    let words = word_count(text);
    let emotion = emotion::analyze(text);
    let (x, y) = random_position(canvas, &config.canvas, rng);

    PlantRecord {
        id: PlantId::generate(rng, now_ms),
        x,
        y,
        height: plant_height(words, emotion.mood, &config.growth),
        complexity: complexity(words, &config.growth),
        text: text.to_string(),
        confidence: sanitize_confidence(confidence, &config.growth),
        mood: emotion.mood,
        energy: emotion.energy,
        alpha: 1.0,
        drift_x: 0.0,
        drift_y: 0.0,
        origin,
        visual: None,
    }
}
