// Mood palettes: foliage colors and stem colors.
//
// Each mood has a small fixed set of translucent pastel foliage colors (one
// is picked per blob) and one stem color.

use crate::types::{Mood, Rgba};

const JOYFUL: &[Rgba] = &[
    Rgba::new(255, 196, 160, 0.75),
    Rgba::new(255, 221, 166, 0.75),
    Rgba::new(244, 178, 197, 0.75),
    Rgba::new(252, 238, 205, 0.7),
];

const CALM: &[Rgba] = &[
    Rgba::new(194, 212, 243, 0.7),
    Rgba::new(212, 233, 220, 0.7),
    Rgba::new(186, 205, 221, 0.7),
    Rgba::new(207, 226, 241, 0.55),
];

const SAD: &[Rgba] = &[
    Rgba::new(168, 187, 207, 0.55),
    Rgba::new(181, 196, 204, 0.5),
    Rgba::new(205, 214, 222, 0.45),
];

const ANGRY: &[Rgba] = &[
    Rgba::new(223, 127, 121, 0.75),
    Rgba::new(214, 96, 113, 0.7),
    Rgba::new(245, 177, 166, 0.6),
];

const NEUTRAL: &[Rgba] = &[
    Rgba::new(194, 212, 243, 0.7),
    Rgba::new(245, 208, 223, 0.7),
    Rgba::new(248, 227, 190, 0.7),
    Rgba::new(212, 233, 220, 0.7),
];

/// White wash painted over a blob's upper-left when it is highlighted.
pub const HIGHLIGHT: Rgba = Rgba::new(255, 255, 255, 0.12);

/// Foliage colors for a mood.
pub fn foliage(mood: Mood) -> &'static [Rgba] {
    match mood {
        Mood::Joyful => JOYFUL,
        Mood::Calm => CALM,
        Mood::Sad => SAD,
        Mood::Angry => ANGRY,
        Mood::Neutral => NEUTRAL,
    }
}

/// Stem stroke color for a mood.
pub fn stem(mood: Mood) -> Rgba {
    match mood {
        Mood::Joyful => Rgba::new(241, 182, 154, 0.5),
        Mood::Calm | Mood::Neutral => Rgba::new(175, 195, 221, 0.5),
        Mood::Sad => Rgba::new(150, 163, 180, 0.45),
        Mood::Angry => Rgba::new(212, 112, 102, 0.55),
    }
}

/// Parse a `#rrggbb` color (used for the configurable background).
/// Anything else yields `None`.
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, 1.0))
}
