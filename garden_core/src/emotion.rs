// Keyword emotion scoring for recognized speech.
//
// `analyze()` lower-cases an utterance and counts, per category, how many of
// that category's keywords appear in it as substrings ("crying" also counts
// "cry"; "badminton" counts "mad"). The strictly largest count picks the
// mood, ties go to the earlier category in `Mood::ALL` order, and an
// utterance with no hits is neutral.
//
// Energy is a separate scalar in [0.4, 1.0]: a 0.4 base, +0.2 for an
// exclamation mark, +0.3 if anything angry was said, +0.2 if anything joyful
// was said, capped at 1.0. The angry and joyful boosts stack.

use crate::types::Mood;

const JOYFUL_WORDS: &[&str] = &[
    "happy", "fun", "love", "lovely", "excited", "yay", "beautiful", "nice", "great", "good",
    "sunny",
];
const CALM_WORDS: &[&str] = &[
    "calm", "quiet", "soft", "peace", "slow", "breathe", "gentle", "relax",
];
const SAD_WORDS: &[&str] = &[
    "sad", "tired", "lonely", "alone", "upset", "cry", "crying", "blue", "exhausted",
];
const ANGRY_WORDS: &[&str] = &[
    "angry", "mad", "annoyed", "frustrated", "hate", "stupid", "ugh",
];

const BASE_ENERGY: f64 = 0.4;
const EXCLAMATION_BOOST: f64 = 0.2;
const ANGRY_BOOST: f64 = 0.3;
const JOYFUL_BOOST: f64 = 0.2;

/// Keyword hit counts per scored category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoodScores {
    pub joyful: u32,
    pub calm: u32,
    pub sad: u32,
    pub angry: u32,
}

impl MoodScores {
    /// Score lower-cased text.
    fn score(lower: &str) -> Self {
        let hits = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count() as u32;
        Self {
            joyful: hits(JOYFUL_WORDS),
            calm: hits(CALM_WORDS),
            sad: hits(SAD_WORDS),
            angry: hits(ANGRY_WORDS),
        }
    }

    /// The winning mood: strictly highest count, earliest category on ties.
    pub fn mood(&self) -> Mood {
        let ranked = [
            (Mood::Joyful, self.joyful),
            (Mood::Calm, self.calm),
            (Mood::Sad, self.sad),
            (Mood::Angry, self.angry),
        ];
        let mut best = (Mood::Neutral, 0);
        for (mood, count) in ranked {
            if count > best.1 {
                best = (mood, count);
            }
        }
        best.0
    }
}

/// Result of scoring one utterance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emotion {
    pub mood: Mood,
    /// Liveliness in [0.4, 1.0].
    pub energy: f64,
    pub scores: MoodScores,
}

/// Score free text into a mood and energy. Never fails; empty text is a
/// neutral, resting utterance.
pub fn analyze(text: &str) -> Emotion {
    let lower = text.to_lowercase();
    let scores = MoodScores::score(&lower);

    let mut energy = BASE_ENERGY;
    if lower.contains('!') {
        energy += EXCLAMATION_BOOST;
    }
    if scores.angry > 0 {
        energy += ANGRY_BOOST;
    }
    if scores.joyful > 0 {
        energy += JOYFUL_BOOST;
    }

    Emotion {
        mood: scores.mood(),
        energy: energy.min(1.0),
        scores,
    }
}
