// Ambient sound cues.
//
// The garden never touches an audio device. `AmbientMixer` tracks what each
// looped track should be doing and emits `AudioCommand`s for the host to
// carry out; if playback fails (autoplay policy, missing file) the host just
// drops the command.
//
// One bird loop plays for as long as the garden is listening. When weather
// starts the bird is ducked under one weather track:
// - rain: heavy when the preset's fall speed reaches the heavy threshold,
//   soft otherwise;
// - wind: strong when the dominant mood is angry or joyful, gentle otherwise.
// When weather ends every weather track is paused and rewound and the bird
// comes back up.
//
// Commands are only emitted for actual changes, so calling `start_bird()` on
// every recognizer start is harmless.

use crate::config::{AudioConfig, WeatherConfig, WeatherPreset};
use crate::types::Mood;
use crate::weather::WeatherMode;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Bird,
    RainSoft,
    RainHeavy,
    WindGentle,
    WindStrong,
}

impl Track {
    pub const ALL: [Track; 5] = [
        Track::Bird,
        Track::RainSoft,
        Track::RainHeavy,
        Track::WindGentle,
        Track::WindStrong,
    ];

    pub const WEATHER: [Track; 4] = [
        Track::RainSoft,
        Track::RainHeavy,
        Track::WindGentle,
        Track::WindStrong,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AudioAction {
    Play,
    Pause,
    /// Seek back to the start.
    Rewind,
    SetVolume(f64),
}

/// One instruction for the host's audio player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioCommand {
    pub track: Track,
    pub action: AudioAction,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TrackState {
    playing: bool,
    /// Position is somewhere past the start.
    advanced: bool,
    volume: Option<f64>,
}

/// Desired state of every ambient track.
#[derive(Clone, Debug)]
pub struct AmbientMixer {
    config: AudioConfig,
    tracks: [TrackState; 5],
}

impl AmbientMixer {
    pub fn new(config: AudioConfig) -> Self {
        let idle = TrackState {
            playing: false,
            advanced: false,
            volume: None,
        };
        Self {
            config,
            tracks: [idle; 5],
        }
    }

    pub fn is_playing(&self, track: Track) -> bool {
        self.tracks[track.index()].playing
    }

    pub fn volume(&self, track: Track) -> Option<f64> {
        self.tracks[track.index()].volume
    }

    /// Bring the bird loop up at its normal volume.
    pub fn start_bird(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        self.set_volume(Track::Bird, self.config.bird_volume, &mut out);
        self.play(Track::Bird, &mut out);
        out
    }

    pub fn duck(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        self.set_volume(Track::Bird, self.config.bird_ducked_volume, &mut out);
        out
    }

    pub fn unduck(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        self.set_volume(Track::Bird, self.config.bird_volume, &mut out);
        out
    }

    /// Duck the bird and start the track matching a new weather effect.
    pub fn weather_started(
        &mut self,
        mode: WeatherMode,
        preset: &WeatherPreset,
        dominant: Mood,
        weather: &WeatherConfig,
    ) -> Vec<AudioCommand> {
        let Some(track) = weather_track(mode, preset, dominant, weather) else {
            return Vec::new();
        };
        let mut out = self.duck();
        self.set_volume(track, self.config.weather_volume, &mut out);
        self.play(track, &mut out);
        out
    }

    /// Silence and rewind every weather track, then unduck the bird.
    pub fn weather_ended(&mut self) -> Vec<AudioCommand> {
        let mut out = self.stop_weather_tracks();
        out.extend(self.unduck());
        out
    }

    /// Silence and rewind every weather track, leaving the bird ducked.
    pub fn stop_weather_tracks(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        for track in Track::WEATHER {
            self.pause(track, &mut out);
            let state = &mut self.tracks[track.index()];
            if state.advanced {
                state.advanced = false;
                out.push(AudioCommand {
                    track,
                    action: AudioAction::Rewind,
                });
            }
        }
        out
    }

    /// Pause everything (session shutdown).
    pub fn stop_all(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        for track in Track::ALL {
            self.pause(track, &mut out);
        }
        out
    }

    fn play(&mut self, track: Track, out: &mut Vec<AudioCommand>) {
        let state = &mut self.tracks[track.index()];
        if !state.playing {
            state.playing = true;
            state.advanced = true;
            out.push(AudioCommand {
                track,
                action: AudioAction::Play,
            });
        }
    }

    fn pause(&mut self, track: Track, out: &mut Vec<AudioCommand>) {
        let state = &mut self.tracks[track.index()];
        if state.playing {
            state.playing = false;
            out.push(AudioCommand {
                track,
                action: AudioAction::Pause,
            });
        }
    }

    fn set_volume(&mut self, track: Track, volume: f64, out: &mut Vec<AudioCommand>) {
        let state = &mut self.tracks[track.index()];
        if state.volume != Some(volume) {
            state.volume = Some(volume);
            out.push(AudioCommand {
                track,
                action: AudioAction::SetVolume(volume),
            });
        }
    }
}

/// The track that accompanies a weather effect, if any.
pub fn weather_track(
    mode: WeatherMode,
    preset: &WeatherPreset,
    dominant: Mood,
    weather: &WeatherConfig,
) -> Option<Track> {
    match mode {
        WeatherMode::None => None,
        WeatherMode::Rainout if preset.fall_speed >= weather.heavy_rain_fall_speed => {
            Some(Track::RainHeavy)
        }
        WeatherMode::Rainout => Some(Track::RainSoft),
        WeatherMode::Windblow if matches!(dominant, Mood::Angry | Mood::Joyful) => {
            Some(Track::WindStrong)
        }
        WeatherMode::Windblow => Some(Track::WindGentle),
    }
}
