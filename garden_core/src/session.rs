// The garden session: one listening installation, driven by its host.
//
// `GardenSession` is the single owner of all garden state: config, PRNG,
// plant store, canvas extent, weather, ambient mixer and the job queue. It
// performs no I/O and reads no clock. The host feeds it four kinds of input
// and carries out what comes back:
//
//   input                              output
//   -----                              ------
//   hear(text, confidence, now)        SessionEvent (UI + audio cues)
//   advance(now)                       GardenRequest (to the endpoint)
//   render_frame(now, surface)         draw calls on the host's Surface
//   handle_response(action, reply)
//
// Events and requests accumulate between calls and are handed over by the
// next `advance()` (or `shutdown()`), so the host has one place to drain
// them. Given the same seed, config and input timeline a session produces
// the same garden, which is how the scenario tests drive it.
//
// ## Planting
//
// `hear()` turns an utterance into a record (`plant_gen`), builds its shape
// graph (`visual`), inserts it (evicting the oldest at capacity), lets the
// canvas grow around it (`canvas`), and, when the remote garden is enabled,
// publishes it with `addPlant`. The published coordinates are the ones after
// any upward shift.
//
// ## Jobs
//
// Each `TaskKind` handler runs when its time comes and reschedules itself
// relative to the moment it actually ran:
// - `IdleSprout`: plants "idle sprout" every 20 s while active.
// - `RemotePoll`: `getPlants` every 5 s (remote enabled only); the reply is
//   merged by `handle_response`.
// - `WeatherCheck`: starts rainout or windblow (60/40) while active, then
//   waits 3–10 minutes.
// - `EmailPopup`: once, 25 s in, unless the email was already saved.
// - `ListenCheck`: every minute, asks the host to start listening if the
//   activation time has passed and the recognizer is not running.
// - `RestartListening`: 300 ms after the recognizer stopped on its own.
// - `HidePopup`: 2 s after a successful email signup.
// - `MidnightSnapshot`: renders the canvas to SVG and uploads it with
//   `saveScreenshot` 5 s after each local midnight.
//
// ## Activation
//
// `schedule.active_from_ms` holds the garden asleep until a given moment:
// before it, speech and idle sprouts are ignored, weather stays off and the
// host is not asked to listen. `ListenCheck` wakes it up.
//
// See also: `event.rs` for the queue and `SessionEvent`, `render.rs` for
// `Surface`, `garden_protocol` for the request/response types.

use crate::audio::{AmbientMixer, AudioCommand};
use crate::canvas::{CanvasExtent, PlantBounds};
use crate::config::{ConfigError, GardenConfig};
use crate::event::{EventQueue, SessionEvent, StatusTone, TaskKind};
use crate::garden::{GardenState, Insertion};
use crate::palette;
use crate::plant::{PlantOrigin, PlantRecord};
use crate::plant_gen;
use crate::render::{self, Surface};
use crate::svg::SvgSurface;
use crate::types::{PlantId, Rgba};
use crate::visual;
use crate::weather::{self, WeatherMode, WeatherState, WeatherTick};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use garden_prng::GardenRng;
use garden_protocol::{GardenRequest, GardenResponse, PlantPayload, RequestAction};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;
const DEFAULT_BACKGROUND: Rgba = Rgba::new(0xf3, 0xf1, 0xe8, 1.0);

pub const STATUS_EMPTY_EMAIL: &str = "Please enter an email.";
pub const STATUS_SAVING: &str = "Saving...";
pub const STATUS_SAVED: &str = "Saved. Thank you!";
pub const STATUS_FAILED: &str = "Could not save right now.";

/// Everything a session produced since the last hand-over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutput {
    pub events: Vec<SessionEvent>,
    pub requests: Vec<GardenRequest>,
}

impl StepOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.requests.is_empty()
    }
}

/// One running garden.
#[derive(Clone, Debug)]
pub struct GardenSession {
    config: GardenConfig,
    rng: GardenRng,
    garden: GardenState,
    canvas: CanvasExtent,
    weather: WeatherState,
    mixer: AmbientMixer,
    queue: EventQueue,
    background: Rgba,
    /// The host's recognizer is running.
    listening: bool,
    popup_visible: bool,
    email_saved: bool,
    shut_down: bool,
    /// Latest timestamp seen from the host.
    clock_ms: u64,
    pending: StepOutput,
}

impl GardenSession {
    /// Start a session at `now_ms` with a viewport of `(width, height)`.
    pub fn new(
        config: GardenConfig,
        seed: u64,
        viewport: (f64, f64),
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = GardenRng::new(seed);
        let background = palette::parse_hex(&config.canvas.background).unwrap_or_else(|| {
            tracing::warn!(
                background = %config.canvas.background,
                "unparseable background color, using default"
            );
            DEFAULT_BACKGROUND
        });

        let schedule = &config.schedule;
        let mut queue = EventQueue::new();
        queue.schedule(now_ms + schedule.idle_sprout_interval_ms, TaskKind::IdleSprout);
        if config.remote.enabled {
            queue.schedule(now_ms + schedule.remote_poll_interval_ms, TaskKind::RemotePoll);
        }
        queue.schedule(
            now_ms + weather::next_delay_ms(&config.weather, &mut rng),
            TaskKind::WeatherCheck,
        );
        queue.schedule(now_ms + schedule.email_popup_delay_ms, TaskKind::EmailPopup);
        queue.schedule(now_ms + schedule.listen_check_interval_ms, TaskKind::ListenCheck);
        queue.schedule(
            next_snapshot_ms(now_ms, schedule.utc_offset_minutes, schedule.snapshot_after_midnight_ms),
            TaskKind::MidnightSnapshot,
        );

        let mut session = Self {
            garden: GardenState::new(config.growth.max_plants),
            canvas: CanvasExtent::new(viewport.0, viewport.1, &config.canvas),
            weather: WeatherState::default(),
            mixer: AmbientMixer::new(config.audio.clone()),
            queue,
            background,
            listening: false,
            popup_visible: false,
            email_saved: false,
            shut_down: false,
            clock_ms: now_ms,
            pending: StepOutput::default(),
            rng,
            config,
        };

        if session.is_active(now_ms) {
            session.pending.events.push(SessionEvent::StartListening);
        } else {
            tracing::info!(
                active_from_ms = ?session.config.schedule.active_from_ms,
                "garden is sleeping until its activation time"
            );
        }
        tracing::info!(
            seed,
            width = session.canvas.width,
            height = session.canvas.height,
            remote = session.config.remote.enabled,
            "garden session started"
        );
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GardenConfig {
        &self.config
    }

    pub fn garden(&self) -> &GardenState {
        &self.garden
    }

    pub fn canvas(&self) -> &CanvasExtent {
        &self.canvas
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    pub fn mixer(&self) -> &AmbientMixer {
        &self.mixer
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub fn email_saved(&self) -> bool {
        self.email_saved
    }

    /// Restore the "already signed up" flag the host persisted earlier.
    pub fn mark_email_saved(&mut self) {
        self.email_saved = true;
    }

    /// When the next job is due, for hosts that sleep between frames.
    pub fn next_job_at(&self) -> Option<u64> {
        self.queue.peek_time()
    }

    /// Whether the activation time has passed.
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.config
            .schedule
            .active_from_ms
            .is_none_or(|from| now_ms >= from)
    }

    // -----------------------------------------------------------------------
    // Host input
    // -----------------------------------------------------------------------

    /// A final recognizer result. Returns the new plant's id, or `None` when
    /// the garden is asleep or shut down, or the generated id collided.
    pub fn hear(&mut self, text: &str, confidence: f64, now_ms: u64) -> Option<PlantId> {
        self.tick_clock(now_ms);
        if self.shut_down || !self.is_active(now_ms) {
            return None;
        }
        self.sprout(text, confidence, PlantOrigin::Speech, now_ms)
    }

    /// Run every job due by `now_ms` and hand over everything produced since
    /// the last call.
    pub fn advance(&mut self, now_ms: u64) -> StepOutput {
        self.tick_clock(now_ms);
        while let Some(job) = self.queue.pop_if_ready(now_ms) {
            self.run_job(job.kind, now_ms);
        }
        std::mem::take(&mut self.pending)
    }

    /// Advance the weather by one frame and paint the garden.
    pub fn render_frame(&mut self, now_ms: u64, surface: &mut dyn Surface) -> WeatherTick {
        self.tick_clock(now_ms);
        let tick = self.weather.update(now_ms, &mut self.garden);
        if let WeatherTick::Ended(mode) = tick {
            self.pending.events.push(SessionEvent::WeatherEnded { mode });
            let cues = self.mixer.weather_ended();
            self.push_audio(cues);
        }
        render::render_garden(
            &self.garden,
            self.canvas.width,
            self.canvas.height,
            self.background,
            self.config.growth.min_visible_alpha,
            surface,
        );
        tick
    }

    /// Apply the endpoint's reply to an earlier request. `None` means the
    /// request failed (network, HTTP status, undecodable body).
    pub fn handle_response(&mut self, action: RequestAction, response: Option<GardenResponse>) {
        let ok = response.as_ref().is_some_and(|r| r.ok);
        match action {
            RequestAction::GetPlants => {
                let Some(response) = response.filter(|r| r.ok) else {
                    tracing::debug!("remote poll returned nothing usable");
                    return;
                };
                let outcome = self.garden.merge_remote(
                    &response.plants,
                    &self.canvas,
                    &self.config,
                    &mut self.rng,
                );
                if !outcome.added.is_empty() {
                    self.pending.events.push(SessionEvent::RemoteMerged {
                        added: outcome.added.len(),
                        evicted: outcome.evicted.len(),
                    });
                }
            }
            RequestAction::RegisterEmail => {
                if ok {
                    self.email_saved = true;
                    self.set_status(STATUS_SAVED, StatusTone::Success);
                    self.pending.events.push(SessionEvent::EmailSaved);
                    self.queue.schedule(
                        self.clock_ms + self.config.schedule.email_popup_hide_delay_ms,
                        TaskKind::HidePopup,
                    );
                } else {
                    self.set_status(STATUS_FAILED, StatusTone::Error);
                }
            }
            RequestAction::AddPlant | RequestAction::SaveScreenshot => {
                if !ok {
                    tracing::debug!(action = action.as_str(), "endpoint did not confirm request");
                }
            }
        }
    }

    /// The host's recognizer started. Brings up the bird loop.
    pub fn recognizer_started(&mut self, now_ms: u64) {
        self.tick_clock(now_ms);
        self.listening = true;
        if self.is_active(now_ms) && !self.shut_down {
            let cues = self.mixer.start_bird();
            self.push_audio(cues);
        }
    }

    /// The host's recognizer stopped. It is restarted shortly if the garden
    /// is active.
    pub fn recognizer_ended(&mut self, now_ms: u64) {
        self.tick_clock(now_ms);
        self.listening = false;
        if self.is_active(now_ms) && !self.shut_down {
            self.queue.schedule(
                now_ms + self.config.schedule.recognizer_restart_delay_ms,
                TaskKind::RestartListening,
            );
        }
    }

    /// Open the email popup with a cleared status line.
    pub fn show_email_popup(&mut self) {
        self.popup_visible = true;
        self.pending.events.push(SessionEvent::ShowEmailPopup);
        self.set_status("", StatusTone::Neutral);
    }

    pub fn hide_email_popup(&mut self) {
        if self.popup_visible {
            self.popup_visible = false;
            self.pending.events.push(SessionEvent::HideEmailPopup);
        }
    }

    /// The visitor pressed "submit". Blank input only updates the status
    /// line; otherwise a `registerEmail` request is queued.
    pub fn submit_email(&mut self, email: &str, now_ms: u64) {
        self.tick_clock(now_ms);
        let email = email.trim();
        if email.is_empty() {
            self.set_status(STATUS_EMPTY_EMAIL, StatusTone::Error);
            return;
        }
        if !self.config.remote.enabled {
            tracing::warn!("email submitted but the remote garden is disabled");
            self.set_status(STATUS_FAILED, StatusTone::Error);
            return;
        }
        self.set_status(STATUS_SAVING, StatusTone::Neutral);
        self.pending.requests.push(GardenRequest::RegisterEmail {
            email: email.to_string(),
            ts: iso_timestamp(now_ms),
            secret: self.config.remote.secret.clone(),
        });
    }

    /// The host's window changed size.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.canvas.resize_viewport(width, height);
        self.pending.events.push(SessionEvent::CanvasResized {
            width: self.canvas.width,
            height: self.canvas.height,
            shifted_by: 0.0,
        });
    }

    /// Start a weather effect now, replacing any running one. `None` just
    /// ends the running effect.
    pub fn trigger_weather(&mut self, mode: WeatherMode, now_ms: u64) {
        self.tick_clock(now_ms);
        let previous = self.weather.mode;
        if previous != WeatherMode::None {
            let cues = if mode == WeatherMode::None {
                self.mixer.weather_ended()
            } else {
                self.mixer.stop_weather_tracks()
            };
            self.pending
                .events
                .push(SessionEvent::WeatherEnded { mode: previous });
            self.push_audio(cues);
        }
        let dominant = self.garden.dominant_mood();
        let preset = self.weather.start(mode, dominant, &self.config.weather, now_ms);
        if mode == WeatherMode::None {
            return;
        }
        self.pending
            .events
            .push(SessionEvent::WeatherStarted { mode, dominant });
        let cues = self
            .mixer
            .weather_started(mode, &preset, dominant, &self.config.weather);
        self.push_audio(cues);
    }

    /// Render the current canvas as an SVG document.
    pub fn snapshot_svg(&self) -> String {
        let mut svg = SvgSurface::new();
        render::render_garden(
            &self.garden,
            self.canvas.width,
            self.canvas.height,
            self.background,
            self.config.growth.min_visible_alpha,
            &mut svg,
        );
        svg.document()
    }

    /// Stop every job and sound. Later input is ignored; the returned output
    /// includes anything still pending.
    pub fn shutdown(&mut self) -> StepOutput {
        if !self.shut_down {
            self.shut_down = true;
            self.queue.clear();
            let cues = self.mixer.stop_all();
            self.push_audio(cues);
            tracing::info!(plants = self.garden.len(), "garden session shut down");
        }
        std::mem::take(&mut self.pending)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn tick_clock(&mut self, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
    }

    fn run_job(&mut self, kind: TaskKind, now_ms: u64) {
        let schedule = &self.config.schedule;
        match kind {
            TaskKind::IdleSprout => {
                let next = now_ms + schedule.idle_sprout_interval_ms;
                if self.is_active(now_ms) {
                    let text = self.config.schedule.idle_sprout_text.clone();
                    let confidence = self.config.schedule.idle_sprout_confidence;
                    self.sprout(&text, confidence, PlantOrigin::Idle, now_ms);
                }
                self.queue.schedule(next, TaskKind::IdleSprout);
            }
            TaskKind::RemotePoll => {
                let next = now_ms + schedule.remote_poll_interval_ms;
                self.pending.requests.push(GardenRequest::GetPlants {
                    garden_id: self.config.remote.garden_id.clone(),
                    secret: self.config.remote.secret.clone(),
                });
                self.queue.schedule(next, TaskKind::RemotePoll);
            }
            TaskKind::WeatherCheck => {
                if self.is_active(now_ms) {
                    let mode = weather::pick_mode(&self.config.weather, &mut self.rng);
                    self.trigger_weather(mode, now_ms);
                }
                let delay = weather::next_delay_ms(&self.config.weather, &mut self.rng);
                self.queue.schedule(now_ms + delay, TaskKind::WeatherCheck);
            }
            TaskKind::EmailPopup => {
                if !self.email_saved {
                    self.show_email_popup();
                }
            }
            TaskKind::ListenCheck => {
                let next = now_ms + schedule.listen_check_interval_ms;
                if self.is_active(now_ms) && !self.listening {
                    tracing::info!("garden is listening");
                    self.pending.events.push(SessionEvent::StartListening);
                }
                self.queue.schedule(next, TaskKind::ListenCheck);
            }
            TaskKind::RestartListening => {
                if self.is_active(now_ms) && !self.listening {
                    self.pending.events.push(SessionEvent::StartListening);
                }
            }
            TaskKind::HidePopup => self.hide_email_popup(),
            TaskKind::MidnightSnapshot => {
                let next = next_snapshot_ms(
                    now_ms,
                    schedule.utc_offset_minutes,
                    schedule.snapshot_after_midnight_ms,
                );
                if self.config.remote.enabled {
                    let image = format!(
                        "data:image/svg+xml;base64,{}",
                        STANDARD.encode(self.snapshot_svg())
                    );
                    self.pending.requests.push(GardenRequest::SaveScreenshot {
                        image,
                        ts: iso_timestamp(now_ms),
                        secret: self.config.remote.secret.clone(),
                    });
                    tracing::info!(plants = self.garden.len(), "daily snapshot queued");
                }
                self.queue.schedule(next, TaskKind::MidnightSnapshot);
            }
        }
    }

    fn sprout(
        &mut self,
        text: &str,
        confidence: f64,
        origin: PlantOrigin,
        now_ms: u64,
    ) -> Option<PlantId> {
        let mut record = plant_gen::generate(
            text,
            confidence,
            origin,
            &self.canvas,
            &self.config,
            &mut self.rng,
            now_ms,
        );
        visual::ensure_visual(&mut record, &mut self.rng);
        let id = record.id.clone();
        let mood = record.mood;
        let bounds = PlantBounds::of(&record, self.config.canvas.expand_margin);

        match self.garden.insert_local(record) {
            Insertion::Inserted { evicted: Some(evicted) } => {
                tracing::debug!(evicted = %evicted.id, "garden full, oldest plant evicted");
            }
            Insertion::Inserted { evicted: None } => {}
            Insertion::Duplicate(_) => {
                tracing::warn!(%id, "generated plant id already in the garden, skipped");
                return None;
            }
        }
        if let Some(expansion) = self.canvas.maybe_expand(bounds, &mut self.garden) {
            self.pending.events.push(SessionEvent::CanvasResized {
                width: expansion.width,
                height: expansion.height,
                shifted_by: expansion.shifted_by,
            });
        }
        tracing::debug!(%id, %mood, ?origin, plants = self.garden.len(), "plant sprouted");
        self.pending.events.push(SessionEvent::PlantSprouted {
            id: id.clone(),
            mood,
            origin,
        });

        if self.config.remote.enabled {
            if let Some(plant) = self.garden.get(&id) {
                let payload = payload_for(plant, now_ms);
                match GardenRequest::add_plant(
                    &self.config.remote.garden_id,
                    &payload,
                    &self.config.remote.secret,
                ) {
                    Ok(request) => self.pending.requests.push(request),
                    Err(e) => tracing::warn!(%id, error = %e, "could not encode plant"),
                }
            }
        }
        Some(id)
    }

    fn set_status(&mut self, message: &str, tone: StatusTone) {
        self.pending.events.push(SessionEvent::EmailStatus {
            message: message.to_string(),
            tone,
        });
    }

    fn push_audio(&mut self, cues: Vec<AudioCommand>) {
        self.pending
            .events
            .extend(cues.into_iter().map(SessionEvent::Audio));
    }
}

/// The `plantJson` object for a stored plant.
pub fn payload_for(plant: &PlantRecord, now_ms: u64) -> PlantPayload {
    PlantPayload {
        id: plant.id.to_string(),
        text: plant.text.clone(),
        confidence: plant.confidence,
        mood: plant.mood.as_str().to_string(),
        energy: plant.energy,
        height: plant.height,
        complexity: plant.complexity,
        x: plant.x,
        y: plant.y,
        created_at: now_ms,
    }
}

/// Epoch milliseconds as an ISO-8601 UTC timestamp with milliseconds.
pub fn iso_timestamp(now_ms: u64) -> String {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// The first `after_ms` past a local midnight strictly after `now_ms`, in a
/// zone `utc_offset_minutes` east of UTC.
pub fn next_snapshot_ms(now_ms: u64, utc_offset_minutes: i32, after_ms: u64) -> u64 {
    local_midnight_after(now_ms, utc_offset_minutes)
        .map(|midnight| midnight + after_ms)
        .unwrap_or(now_ms + DAY_MS)
}

fn local_midnight_after(now_ms: u64, utc_offset_minutes: i32) -> Option<u64> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    let now = DateTime::<Utc>::from_timestamp_millis(i64::try_from(now_ms).ok()?)?.with_timezone(&offset);
    let tomorrow = now.date_naive().succ_opt()?;
    let midnight = tomorrow
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(offset)
        .single()?;
    u64::try_from(midnight.timestamp_millis()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioAction, Track};
    use crate::render::DrawList;
    use crate::types::Mood;

    const T0: u64 = 1_700_000_000_000;

    fn remote_config() -> GardenConfig {
        let mut config = GardenConfig::default();
        config.remote.enabled = true;
        config.remote.garden_id = "studio".into();
        config.remote.secret = "s3cret".into();
        config
    }

    #[test]
    fn starts_listening_immediately_when_active() {
        let mut session = GardenSession::new(GardenConfig::default(), 1, (800.0, 600.0), T0).unwrap();
        let out = session.advance(T0);
        assert_eq!(out.events, vec![SessionEvent::StartListening]);
        assert!(out.requests.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = GardenConfig::default();
        config.growth.max_plants = 0;
        assert!(GardenSession::new(config, 1, (800.0, 600.0), T0).is_err());
    }

    #[test]
    fn zero_repeat_interval_is_rejected() {
        let mut config = GardenConfig::default();
        config.schedule.idle_sprout_interval_ms = 0;
        assert!(GardenSession::new(config, 1, (800.0, 600.0), T0).is_err());
    }

    #[test]
    fn idle_sprout_plants_every_twenty_seconds() {
        let mut session = GardenSession::new(GardenConfig::default(), 3, (800.0, 600.0), T0).unwrap();
        session.advance(T0);
        assert!(session.advance(T0 + 19_999).events.is_empty());

        let out = session.advance(T0 + 20_000);
        let sprouted: Vec<&PlantId> = out
            .events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::PlantSprouted { id, origin: PlantOrigin::Idle, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(sprouted.len(), 1);
        let plant = session.garden().get(sprouted[0]).unwrap();
        assert_eq!(plant.text, "idle sprout");
        assert_eq!(plant.confidence, 0.5);
        assert_eq!(plant.origin, PlantOrigin::Idle);

        session.advance(T0 + 40_000);
        assert_eq!(session.garden().len(), 2);
    }

    #[test]
    fn colliding_plant_id_is_not_planted_twice() {
        let mut session = GardenSession::new(remote_config(), 4, (800.0, 600.0), T0).unwrap();
        session.advance(T0);
        session.rng = GardenRng::new(77);
        let first = session.hear("hello garden", 0.9, T0 + 5).unwrap();
        session.advance(T0 + 5);

        session.rng = GardenRng::new(77);
        assert_eq!(session.hear("hello garden", 0.9, T0 + 5), None);
        let out = session.advance(T0 + 5);
        assert!(out.is_empty());
        assert_eq!(session.garden().len(), 1);
        assert!(session.garden().get(&first).is_some());
    }

    #[test]
    fn hearing_sprouts_and_publishes() {
        let mut session = GardenSession::new(remote_config(), 9, (1024.0, 768.0), T0).unwrap();
        session.advance(T0);
        let id = session.hear("I am so happy today!", 0.9, T0 + 10).unwrap();
        let out = session.advance(T0 + 10);

        assert!(out.events.iter().any(|e| matches!(
            e,
            SessionEvent::PlantSprouted { mood: Mood::Joyful, origin: PlantOrigin::Speech, .. }
        )));
        assert_eq!(out.requests.len(), 1);
        match &out.requests[0] {
            GardenRequest::AddPlant { garden_id, plant_json, secret } => {
                assert_eq!(garden_id, "studio");
                assert_eq!(secret, "s3cret");
                let payload: PlantPayload = serde_json::from_str(plant_json).unwrap();
                assert_eq!(payload.id, id.as_str());
                assert_eq!(payload.mood, "joyful");
                assert_eq!(payload.complexity, 2);
                assert_eq!(payload.created_at, T0 + 10);
                let stored = session.garden().get(&id).unwrap();
                assert_eq!((payload.x, payload.y), (stored.x, stored.y));
            }
            other => panic!("expected addPlant, got {other:?}"),
        }
        assert!(session.garden().get(&id).unwrap().visual.is_some());
    }

    #[test]
    fn sleeping_garden_ignores_speech_until_activation() {
        let mut config = GardenConfig::default();
        config.schedule.active_from_ms = Some(T0 + 90_000);
        let mut session = GardenSession::new(config, 2, (800.0, 600.0), T0).unwrap();
        assert!(session.advance(T0).is_empty());
        assert!(session.hear("hello there", 0.9, T0 + 1).is_none());

        // First listen check (60 s) is still before activation.
        let out = session.advance(T0 + 60_000);
        assert!(!out.events.contains(&SessionEvent::StartListening));
        assert!(session.garden().is_empty(), "idle sprouts must wait too");

        let out = session.advance(T0 + 120_000);
        assert!(out.events.contains(&SessionEvent::StartListening));
        assert!(session.hear("hello there", 0.9, T0 + 120_001).is_some());
    }

    #[test]
    fn recognizer_restart_cycle() {
        let mut session = GardenSession::new(GardenConfig::default(), 3, (800.0, 600.0), T0).unwrap();
        session.advance(T0);
        session.recognizer_started(T0 + 5);
        let out = session.advance(T0 + 5);
        assert!(out.events.contains(&SessionEvent::Audio(AudioCommand {
            track: Track::Bird,
            action: AudioAction::Play,
        })));

        session.recognizer_ended(T0 + 1_000);
        assert!(!session.advance(T0 + 1_299).events.contains(&SessionEvent::StartListening));
        assert!(session.advance(T0 + 1_300).events.contains(&SessionEvent::StartListening));
    }

    #[test]
    fn email_flow() {
        let mut session = GardenSession::new(remote_config(), 4, (800.0, 600.0), T0).unwrap();
        session.advance(T0);

        let out = session.advance(T0 + 25_000);
        assert!(out.events.contains(&SessionEvent::ShowEmailPopup));
        assert!(session.popup_visible());

        session.submit_email("   ", T0 + 26_000);
        let out = session.advance(T0 + 26_000);
        assert!(out.events.contains(&SessionEvent::EmailStatus {
            message: STATUS_EMPTY_EMAIL.into(),
            tone: StatusTone::Error,
        }));
        assert!(out.requests.is_empty());

        session.submit_email(" visitor@example.com ", T0 + 27_000);
        let out = session.advance(T0 + 27_000);
        match &out.requests[..] {
            [GardenRequest::RegisterEmail { email, ts, .. }] => {
                assert_eq!(email, "visitor@example.com");
                assert!(ts.ends_with('Z'));
            }
            other => panic!("expected registerEmail, got {other:?}"),
        }

        session.handle_response(
            RequestAction::RegisterEmail,
            Some(GardenResponse { ok: true, ..GardenResponse::default() }),
        );
        let out = session.advance(T0 + 27_500);
        assert!(out.events.contains(&SessionEvent::EmailSaved));
        assert!(session.email_saved());
        assert!(session.popup_visible());

        let out = session.advance(T0 + 29_000);
        assert!(out.events.contains(&SessionEvent::HideEmailPopup));
        assert!(!session.popup_visible());
    }

    #[test]
    fn failed_email_save_reports_error() {
        let mut session = GardenSession::new(remote_config(), 4, (800.0, 600.0), T0).unwrap();
        session.submit_email("a@b.c", T0);
        session.handle_response(RequestAction::RegisterEmail, None);
        let out = session.advance(T0);
        assert!(out.events.contains(&SessionEvent::EmailStatus {
            message: STATUS_FAILED.into(),
            tone: StatusTone::Error,
        }));
        assert!(!session.email_saved());
    }

    #[test]
    fn saved_email_suppresses_popup() {
        let mut session = GardenSession::new(GardenConfig::default(), 5, (800.0, 600.0), T0).unwrap();
        session.mark_email_saved();
        let out = session.advance(T0 + 30_000);
        assert!(!out.events.contains(&SessionEvent::ShowEmailPopup));
    }

    #[test]
    fn weather_runs_and_ends_with_audio_cues() {
        let mut session = GardenSession::new(GardenConfig::default(), 6, (800.0, 600.0), T0).unwrap();
        session.hear("ugh I hate this, so annoyed", 0.9, T0);
        session.advance(T0);
        session.trigger_weather(WeatherMode::Rainout, T0 + 100);
        let out = session.advance(T0 + 100);
        assert!(out.events.contains(&SessionEvent::WeatherStarted {
            mode: WeatherMode::Rainout,
            dominant: Mood::Angry,
        }));
        assert!(out.events.contains(&SessionEvent::Audio(AudioCommand {
            track: Track::RainHeavy,
            action: AudioAction::Play,
        })));

        let mut list = DrawList::new();
        assert_eq!(session.render_frame(T0 + 116, &mut list), WeatherTick::Applied);
        let plant = session.garden().iter().next().unwrap();
        assert!((plant.drift_y - 0.55).abs() < 1e-12);

        assert_eq!(
            session.render_frame(T0 + 100 + 12_001, &mut list),
            WeatherTick::Ended(WeatherMode::Rainout)
        );
        let out = session.advance(T0 + 12_200);
        assert!(out.events.contains(&SessionEvent::WeatherEnded { mode: WeatherMode::Rainout }));
        assert!(out.events.contains(&SessionEvent::Audio(AudioCommand {
            track: Track::RainHeavy,
            action: AudioAction::Rewind,
        })));
    }

    #[test]
    fn weather_check_starts_weather_within_ten_minutes() {
        let mut session = GardenSession::new(GardenConfig::default(), 5, (800.0, 600.0), T0).unwrap();
        session.advance(T0);
        let out = session.advance(T0 + 600_001);
        assert!(out
            .events
            .iter()
            .any(|e| matches!(e, SessionEvent::WeatherStarted { .. })));
        assert!(session.weather().is_active());
        assert!(session.queue.has_pending(TaskKind::WeatherCheck));
    }

    #[test]
    fn switching_weather_stops_the_previous_track() {
        let mut session = GardenSession::new(GardenConfig::default(), 6, (800.0, 600.0), T0).unwrap();
        session.hear("I feel so sad and lonely", 0.9, T0);
        session.advance(T0);
        session.trigger_weather(WeatherMode::Rainout, T0 + 100);
        session.advance(T0 + 100);
        assert!(session.mixer().is_playing(Track::RainHeavy));

        session.trigger_weather(WeatherMode::Windblow, T0 + 200);
        let out = session.advance(T0 + 200);
        assert!(out.events.contains(&SessionEvent::WeatherEnded { mode: WeatherMode::Rainout }));
        assert!(out.events.contains(&SessionEvent::Audio(AudioCommand {
            track: Track::RainHeavy,
            action: AudioAction::Pause,
        })));
        assert!(!session.mixer().is_playing(Track::RainHeavy));
        assert!(out.events.contains(&SessionEvent::WeatherStarted {
            mode: WeatherMode::Windblow,
            dominant: Mood::Sad,
        }));

        session.trigger_weather(WeatherMode::None, T0 + 300);
        let out = session.advance(T0 + 300);
        assert!(out.events.contains(&SessionEvent::WeatherEnded { mode: WeatherMode::Windblow }));
        assert!(!session.weather().is_active());
    }

    #[test]
    fn remote_poll_merges_reply() {
        let mut session = GardenSession::new(remote_config(), 7, (800.0, 600.0), T0).unwrap();
        session.advance(T0);
        let out = session.advance(T0 + 5_000);
        assert!(matches!(out.requests[..], [GardenRequest::GetPlants { .. }]));

        let reply: GardenResponse = serde_json::from_str(
            r#"{"ok":true,"plants":[{"id":"r1","x":100,"y":200,"mood":"sad"},{"createdAt":5}]}"#,
        )
        .unwrap();
        session.handle_response(RequestAction::GetPlants, Some(reply.clone()));
        session.handle_response(RequestAction::GetPlants, Some(reply));
        assert_eq!(session.garden().len(), 2);
        let out = session.advance(T0 + 5_001);
        let merges: Vec<&SessionEvent> = out
            .events
            .iter()
            .filter(|e| matches!(e, SessionEvent::RemoteMerged { .. }))
            .collect();
        assert_eq!(merges, vec![&SessionEvent::RemoteMerged { added: 2, evicted: 0 }]);
    }

    #[test]
    fn remote_disabled_sends_nothing() {
        let mut session = GardenSession::new(GardenConfig::default(), 8, (800.0, 600.0), T0).unwrap();
        session.hear("hello", 0.9, T0);
        let out = session.advance(T0 + 60_000);
        assert!(out.requests.is_empty());
    }

    #[test]
    fn midnight_snapshot_is_uploaded_daily() {
        // 2023-11-14T22:13:20Z; next UTC midnight is 2023-11-15T00:00:00Z.
        let midnight = 1_700_006_400_000;
        let mut session = GardenSession::new(remote_config(), 10, (300.0, 200.0), T0).unwrap();
        assert_eq!(next_snapshot_ms(T0, 0, 5_000), midnight + 5_000);

        let out = session.advance(midnight + 5_000);
        let shots: Vec<&GardenRequest> = out
            .requests
            .iter()
            .filter(|r| matches!(r, GardenRequest::SaveScreenshot { .. }))
            .collect();
        assert_eq!(shots.len(), 1);
        if let GardenRequest::SaveScreenshot { image, ts, .. } = shots[0] {
            assert!(image.starts_with("data:image/svg+xml;base64,"));
            assert_eq!(ts, "2023-11-15T00:00:05.000Z");
        }
        assert_eq!(
            next_snapshot_ms(midnight + 5_000, 0, 5_000),
            midnight + DAY_MS + 5_000
        );
    }

    #[test]
    fn midnight_respects_utc_offset() {
        // 2023-11-14T22:13:20Z is 23:13:20 at UTC+1, so local midnight is
        // 2023-11-14T23:00:00Z.
        assert_eq!(next_snapshot_ms(T0, 60, 0), 1_700_002_800_000);
        // At UTC-5 it is 17:13:20; local midnight is 2023-11-15T05:00:00Z.
        assert_eq!(next_snapshot_ms(T0, -300, 0), 1_700_024_400_000);
    }

    #[test]
    fn shutdown_silences_everything() {
        let mut session = GardenSession::new(GardenConfig::default(), 11, (800.0, 600.0), T0).unwrap();
        session.recognizer_started(T0);
        let out = session.shutdown();
        assert!(out.events.contains(&SessionEvent::Audio(AudioCommand {
            track: Track::Bird,
            action: AudioAction::Pause,
        })));
        assert!(session.hear("still here?", 0.9, T0 + 1).is_none());
        assert!(session.advance(T0 + DAY_MS).is_empty());
        assert_eq!(session.next_job_at(), None);
    }
}
