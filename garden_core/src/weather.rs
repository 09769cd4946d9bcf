// Weather effects: timed, garden-wide drift and fade.
//
// At most one effect runs at a time. While it runs, every frame pushes
// every stored plant by the preset's per-frame drift and lowers its alpha by
// the preset's fade speed:
// - `Rainout`: plants slide down (`fall_speed`) and sideways (`drift_x`).
//   The preset depends on the garden's dominant mood when the rain starts:
//   sad rain falls hardest, calm rain barely moves.
// - `Windblow`: plants slide sideways only; one preset for every mood.
//
// An effect ends on the first frame whose timestamp is more than
// `duration_ms` past its start. Drift and fade are never undone: a garden
// that sat through enough weather is mostly invisible (alpha floors at 0)
// until new plants grow. Faded plants still count for capacity and for the
// dominant mood.
//
// Triggering is the scheduler's job (`TaskKind::WeatherCheck` in
// `event.rs`): `pick_mode` chooses the kind, `next_delay_ms` the gap to the
// next trigger.
//
// See also: `config.rs` for `WeatherPreset` and its defaults, `audio.rs` for
// the matching ambient tracks.

use crate::config::{WeatherConfig, WeatherPreset};
use crate::garden::GardenState;
use crate::types::Mood;
use garden_prng::GardenRng;
use serde::{Deserialize, Serialize};

/// Which effect is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    #[default]
    None,
    Rainout,
    Windblow,
}

/// Result of one `update()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherTick {
    /// No effect running.
    Idle,
    /// Drift and fade were applied to every plant.
    Applied,
    /// The running effect ran out on this frame; nothing was applied.
    Ended(WeatherMode),
}

/// The running effect (or `WeatherMode::None`) and its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    pub mode: WeatherMode,
    pub params: WeatherPreset,
    pub started_at_ms: u64,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            mode: WeatherMode::None,
            params: WeatherPreset::new(0.4, 0.003, 0.0, 12_000),
            started_at_ms: 0,
        }
    }
}

impl WeatherState {
    pub fn is_active(&self) -> bool {
        self.mode != WeatherMode::None
    }

    /// Start an effect, replacing any running one. Starting `None` stops the
    /// current effect without applying anything.
    pub fn start(
        &mut self,
        mode: WeatherMode,
        dominant: Mood,
        config: &WeatherConfig,
        now_ms: u64,
    ) -> WeatherPreset {
        self.params = match mode {
            WeatherMode::Rainout => config.rainout_for(dominant),
            WeatherMode::Windblow => config.windblow,
            WeatherMode::None => self.params,
        };
        self.mode = mode;
        self.started_at_ms = now_ms;
        if mode != WeatherMode::None {
            tracing::info!(?mode, %dominant, preset = ?self.params, "weather started");
        }
        self.params
    }

    /// Advance the effect by one frame.
    pub fn update(&mut self, now_ms: u64, garden: &mut GardenState) -> WeatherTick {
        let mode = self.mode;
        if mode == WeatherMode::None {
            return WeatherTick::Idle;
        }
        if now_ms.saturating_sub(self.started_at_ms) > self.params.duration_ms {
            self.mode = WeatherMode::None;
            tracing::info!(?mode, "weather ended");
            return WeatherTick::Ended(mode);
        }

        let fall = match mode {
            WeatherMode::Rainout => self.params.fall_speed,
            _ => 0.0,
        };
        for plant in garden.iter_mut() {
            plant.drift_y += fall;
            plant.drift_x += self.params.drift_x;
            plant.fade(self.params.fade_speed);
        }
        WeatherTick::Applied
    }
}

/// Roll which effect a weather trigger starts.
pub fn pick_mode(config: &WeatherConfig, rng: &mut GardenRng) -> WeatherMode {
    if rng.random_bool(config.rainout_probability) {
        WeatherMode::Rainout
    } else {
        WeatherMode::Windblow
    }
}

/// Gap until the next weather trigger, uniform in `[min, max]`.
pub fn next_delay_ms(config: &WeatherConfig, rng: &mut GardenRng) -> u64 {
    if config.min_interval_ms >= config.max_interval_ms {
        return config.min_interval_ms;
    }
    rng.range_u64(config.min_interval_ms, config.max_interval_ms + 1)
}
