// Core types shared across the garden.
//
// Defines the `Mood` label (with its fixed tie-break order), the `PlantId`
// string identifier, the `Rgba` color used by palettes and surfaces, and the
// 2D `Point` used by stem curves. All types derive `Serialize`/`Deserialize`
// because plants travel to and from the remote garden endpoint.

use garden_prng::GardenRng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Categorical emotion label derived from keyword scoring.
///
/// Declaration order is the tie-break order used everywhere a mood is chosen
/// by count (`analyze`, `dominant_mood`): joyful, calm, sad, angry, neutral.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Joyful,
    Calm,
    Sad,
    Angry,
    #[default]
    Neutral,
}

impl Mood {
    /// Every mood in tie-break order.
    pub const ALL: [Mood; 5] = [Mood::Joyful, Mood::Calm, Mood::Sad, Mood::Angry, Mood::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Joyful => "joyful",
            Mood::Calm => "calm",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Neutral => "neutral",
        }
    }

    /// Parse a mood label from an untrusted source. Anything unrecognized is
    /// treated as neutral, matching how remote plants are drawn.
    pub fn parse_lenient(label: &str) -> Mood {
        match label.trim().to_ascii_lowercase().as_str() {
            "joyful" => Mood::Joyful,
            "calm" => Mood::Calm,
            "sad" => Mood::Sad,
            "angry" => Mood::Angry,
            _ => Mood::Neutral,
        }
    }

    /// Stem-height multiplier applied after the word-count height.
    pub fn height_multiplier(self) -> f64 {
        match self {
            Mood::Sad => 0.8,
            Mood::Calm => 0.9,
            Mood::Joyful | Mood::Angry => 1.05,
            Mood::Neutral => 1.0,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Plant ids
// ---------------------------------------------------------------------------

/// Stable identifier of a plant, shared with every client of the same garden.
///
/// Locally sprouted plants get `p_<ms base36>_<random base36>`; remote plants
/// keep whatever non-empty string the endpoint handed back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(String);

impl PlantId {
    /// Generate a fresh id from the clock and the session PRNG.
    pub fn generate(rng: &mut GardenRng, now_ms: u64) -> Self {
        let salt = rng.range_u64(0, 1_000_000);
        Self(format!("p_{}_{}", to_base36(now_ms), to_base36(salt)))
    }

    /// Wrap an externally supplied id. Blank ids are rejected.
    pub fn from_remote(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase base-36 rendering, as produced by JavaScript's `toString(36)`.
fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Geometry and color
// ---------------------------------------------------------------------------

/// A point in canvas pixel space. Y grows downward, as on an HTML canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This point displaced by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A translucent sRGB color, formatted like a CSS `rgba()` value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` without the alpha channel (SVG fill attribute).
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_order_is_tie_break_order() {
        let mut sorted = Mood::ALL;
        sorted.sort();
        assert_eq!(sorted, Mood::ALL);
        assert_eq!(Mood::ALL[0], Mood::Joyful);
        assert_eq!(Mood::ALL[4], Mood::Neutral);
    }

    #[test]
    fn mood_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Angry).unwrap(), "\"angry\"");
        let m: Mood = serde_json::from_str("\"calm\"").unwrap();
        assert_eq!(m, Mood::Calm);
    }

    #[test]
    fn unknown_mood_labels_are_neutral() {
        assert_eq!(Mood::parse_lenient("Joyful "), Mood::Joyful);
        assert_eq!(Mood::parse_lenient("ecstatic"), Mood::Neutral);
        assert_eq!(Mood::parse_lenient(""), Mood::Neutral);
    }

    #[test]
    fn base36_matches_javascript() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn generated_ids_have_expected_shape() {
        let mut rng = GardenRng::new(1);
        let id = PlantId::generate(&mut rng, 36);
        assert!(id.as_str().starts_with("p_10_"), "got {id}");
        let other = PlantId::generate(&mut rng, 36);
        assert_ne!(id, other);
    }

    #[test]
    fn blank_remote_ids_are_rejected() {
        assert!(PlantId::from_remote("   ").is_none());
        assert_eq!(PlantId::from_remote(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn rgba_formats_like_css() {
        let c = Rgba::new(255, 196, 160, 0.75);
        assert_eq!(c.to_string(), "rgba(255, 196, 160, 0.75)");
        assert_eq!(c.hex(), "#ffc4a0");
    }
}
