// Data-driven garden configuration.
//
// Every tunable number the garden uses lives in `GardenConfig`, loaded from
// JSON (or left at its defaults). Parameters are grouped the way they are
// consumed:
// - `CanvasConfig`:   extent maxima and the spawn/expansion margins.
// - `GrowthConfig`:   speech-to-plant sizing (height per word, complexity).
// - `WeatherConfig`:  rainout presets per dominant mood, the windblow preset,
//                     trigger odds and interval bounds.
// - `ScheduleConfig`: the cadence of every recurring task in `event.rs`.
// - `AudioConfig`:    ambient volumes for the bird loop and weather tracks.
// - `RemoteSettings`: garden id and the opaque shared secret for the endpoint.
//
// Every group is `#[serde(default)]`, so a config file only needs the keys it
// overrides. `GardenConfig::default()` reproduces the behavior of the
// installation the garden was built for (700 plants, 5000px maxima, 20 s idle
// sprouts, 3–10 minute weather).
//
// See also: `session.rs` which owns the config, `weather.rs` for
// `WeatherPreset`, `plant_gen.rs` and `canvas.rs` for the geometry knobs.

use crate::types::Mood;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Failure to load a `GardenConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// Drawing-surface bounds and margins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Hard cap on canvas width, in pixels.
    pub max_width: f64,
    /// Hard cap on canvas height, in pixels.
    pub max_height: f64,
    /// Inset from every edge when placing a new plant at random.
    pub spawn_margin: f64,
    /// Lower bound on the random placement span, used when the canvas is
    /// narrower than twice the spawn margin.
    pub min_spawn_span: f64,
    /// Padding around a plant's stem and crown that must fit on the canvas.
    pub expand_margin: f64,
    /// Background fill drawn at the start of every frame.
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_width: 5000.0,
            max_height: 5000.0,
            spawn_margin: 80.0,
            min_spawn_span: 200.0,
            expand_margin: 120.0,
            background: "#f3f1e8".to_string(),
        }
    }
}

/// Speech-to-plant sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Maximum number of plants kept in the garden; the oldest are evicted.
    pub max_plants: usize,
    /// Stem height of a zero-word utterance, before the mood multiplier.
    pub base_height: f64,
    /// Extra stem height per counted word.
    pub height_per_word: f64,
    /// Words beyond this count no longer add height.
    pub max_counted_words: usize,
    /// One extra complexity level per this many words.
    pub words_per_complexity: usize,
    /// Upper bound on complexity (lower bound is always 1).
    pub max_complexity: u8,
    /// Confidence used when the recognizer reports none (or garbage).
    pub default_confidence: f64,
    /// Alpha at or below which a plant is no longer drawn.
    pub min_visible_alpha: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_plants: 700,
            base_height: 120.0,
            height_per_word: 7.0,
            max_counted_words: 20,
            words_per_complexity: 4,
            max_complexity: 4,
            default_confidence: 0.8,
            min_visible_alpha: 0.01,
        }
    }
}

/// Motion and fade applied to every plant while a weather effect runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherPreset {
    /// Downward drift per frame, in pixels.
    pub fall_speed: f64,
    /// Alpha lost per frame.
    pub fade_speed: f64,
    /// Horizontal drift per frame, in pixels.
    pub drift_x: f64,
    /// Effect length in milliseconds.
    pub duration_ms: u64,
}

impl WeatherPreset {
    pub const fn new(fall_speed: f64, fade_speed: f64, drift_x: f64, duration_ms: u64) -> Self {
        Self {
            fall_speed,
            fade_speed,
            drift_x,
            duration_ms,
        }
    }
}

/// Weather triggering and per-mood presets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Rainout preset keyed by the garden's dominant mood.
    pub rainout: BTreeMap<Mood, WeatherPreset>,
    /// The single windblow preset.
    pub windblow: WeatherPreset,
    /// Probability a triggered effect is a rainout (otherwise windblow).
    pub rainout_probability: f64,
    /// Shortest gap between weather triggers.
    pub min_interval_ms: u64,
    /// Longest gap between weather triggers.
    pub max_interval_ms: u64,
    /// Fall speed at or above which rain uses the heavy track.
    pub heavy_rain_fall_speed: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let mut rainout = BTreeMap::new();
        rainout.insert(Mood::Joyful, WeatherPreset::new(0.3, 0.0015, 0.15, 12_000));
        rainout.insert(Mood::Calm, WeatherPreset::new(0.15, 0.0009, 0.0, 12_000));
        rainout.insert(Mood::Sad, WeatherPreset::new(0.6, 0.003, 0.0, 12_000));
        rainout.insert(Mood::Angry, WeatherPreset::new(0.55, 0.004, 0.3, 12_000));
        rainout.insert(Mood::Neutral, WeatherPreset::new(0.4, 0.003, 0.0, 12_000));
        Self {
            rainout,
            windblow: WeatherPreset::new(0.0, 0.0025, 0.5, 10_000),
            rainout_probability: 0.6,
            min_interval_ms: 3 * 60 * 1000,
            max_interval_ms: 10 * 60 * 1000,
            heavy_rain_fall_speed: 0.5,
        }
    }
}

impl WeatherConfig {
    /// Rainout preset for a mood, falling back to the neutral preset (and
    /// then to the built-in neutral numbers) when a config omits it.
    pub fn rainout_for(&self, mood: Mood) -> WeatherPreset {
        self.rainout
            .get(&mood)
            .or_else(|| self.rainout.get(&Mood::Neutral))
            .copied()
            .unwrap_or(WeatherPreset::new(0.4, 0.003, 0.0, 12_000))
    }
}

/// Cadence of the recurring tasks driven by the session scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Gap between synthetic "idle" plants.
    pub idle_sprout_interval_ms: u64,
    /// Text used for idle plants.
    pub idle_sprout_text: String,
    /// Confidence reported for idle plants.
    pub idle_sprout_confidence: f64,
    /// Gap between `getPlants` polls.
    pub remote_poll_interval_ms: u64,
    /// Delay before the email popup first appears.
    pub email_popup_delay_ms: u64,
    /// How long the popup lingers after a successful save.
    pub email_popup_hide_delay_ms: u64,
    /// Gap between checks that the garden has become active.
    pub listen_check_interval_ms: u64,
    /// Delay before restarting a recognizer that stopped on its own.
    pub recognizer_restart_delay_ms: u64,
    /// Offset past local midnight at which the daily snapshot is taken.
    pub snapshot_after_midnight_ms: u64,
    /// Local time zone as minutes east of UTC, used to find midnight.
    pub utc_offset_minutes: i32,
    /// Epoch milliseconds before which the garden ignores speech and stays
    /// silent. `None` means always active.
    pub active_from_ms: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            idle_sprout_interval_ms: 20_000,
            idle_sprout_text: "idle sprout".to_string(),
            idle_sprout_confidence: 0.5,
            remote_poll_interval_ms: 5_000,
            email_popup_delay_ms: 25_000,
            email_popup_hide_delay_ms: 2_000,
            listen_check_interval_ms: 60_000,
            recognizer_restart_delay_ms: 300,
            snapshot_after_midnight_ms: 5_000,
            utc_offset_minutes: 0,
            active_from_ms: None,
        }
    }
}

/// Ambient track volumes (0.0–1.0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub bird_volume: f64,
    /// Bird volume while a weather track plays over it.
    pub bird_ducked_volume: f64,
    pub weather_volume: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bird_volume: 0.5,
            bird_ducked_volume: 0.15,
            weather_volume: 0.6,
        }
    }
}

/// Identity used with the remote garden endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// When false, no requests are produced at all.
    pub enabled: bool,
    /// Which shared garden this client plants into and polls.
    pub garden_id: String,
    /// Opaque shared token passed through on every request.
    pub secret: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            garden_id: "main".to_string(),
            secret: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Complete garden configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    pub canvas: CanvasConfig,
    pub growth: GrowthConfig,
    pub weather: WeatherConfig,
    pub schedule: ScheduleConfig,
    pub audio: AudioConfig,
    pub remote: RemoteSettings,
}

impl GardenConfig {
    /// Parse and validate a JSON config. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GardenConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values the generators cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.growth.max_plants == 0 {
            return Err(ConfigError::Invalid("growth.max_plants must be > 0".into()));
        }
        if self.growth.max_complexity == 0 {
            return Err(ConfigError::Invalid(
                "growth.max_complexity must be >= 1".into(),
            ));
        }
        if self.growth.words_per_complexity == 0 {
            return Err(ConfigError::Invalid(
                "growth.words_per_complexity must be > 0".into(),
            ));
        }
        if self.canvas.max_width <= 0.0 || self.canvas.max_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "canvas maxima must be positive".into(),
            ));
        }
        let repeating = [
            ("schedule.idle_sprout_interval_ms", self.schedule.idle_sprout_interval_ms),
            ("schedule.remote_poll_interval_ms", self.schedule.remote_poll_interval_ms),
            ("schedule.listen_check_interval_ms", self.schedule.listen_check_interval_ms),
            ("weather.min_interval_ms", self.weather.min_interval_ms),
        ];
        if let Some((name, _)) = repeating.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be > 0")));
        }
        if self.weather.min_interval_ms > self.weather.max_interval_ms {
            return Err(ConfigError::Invalid(
                "weather.min_interval_ms exceeds weather.max_interval_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.weather.rainout_probability) {
            return Err(ConfigError::Invalid(
                "weather.rainout_probability must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
