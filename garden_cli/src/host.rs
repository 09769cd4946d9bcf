// The terminal host: the part of the installation outside the garden.
//
// `Host` plays the roles a browser page would. Stdin lines are the speech
// recognizer, a `DrawList` stands in for the canvas, audio cues and popups
// are logged, and requests go to the endpoint through a `RemoteClient`.
// Everything time-dependent takes `now_ms` from the caller, so the same
// `Host` runs against the wall clock or a simulated one.

use std::io::Write;

use garden_core::render::DrawList;
use garden_core::{GardenSession, SessionEvent, StepOutput};
use garden_protocol::GardenRequest;
use garden_remote::RemoteClient;

use crate::input::Input;

/// Running totals for the end-of-session summary.
#[derive(Clone, Debug, Default)]
pub struct HostStats {
    pub utterances: u64,
    pub frames: u64,
    pub requests_sent: u64,
    pub requests_failed: u64,
}

pub struct Host {
    session: GardenSession,
    remote: Option<RemoteClient>,
    frame: DrawList,
    /// Print every session event to stdout as a JSON line.
    print_events: bool,
    stats: HostStats,
    quit: bool,
}

impl Host {
    pub fn new(session: GardenSession, remote: Option<RemoteClient>, print_events: bool) -> Self {
        Self {
            session,
            remote,
            frame: DrawList::new(),
            print_events,
            stats: HostStats::default(),
            quit: false,
        }
    }

    pub fn session(&self) -> &GardenSession {
        &self.session
    }

    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn apply(&mut self, input: Input, now_ms: u64) {
        match input {
            Input::Speech { text, confidence } => {
                self.stats.utterances += 1;
                if self.session.hear(&text, confidence, now_ms).is_none() {
                    tracing::info!(%text, "garden is not listening yet");
                }
            }
            Input::Email(address) => self.session.submit_email(&address, now_ms),
            Input::Weather(mode) => self.session.trigger_weather(mode, now_ms),
            Input::Resize { width, height } => self.session.resize_viewport(width, height),
            Input::Quit => self.quit = true,
        }
    }

    /// One host tick: collect endpoint replies, run due jobs, carry out
    /// what they produced, and paint a frame.
    pub fn tick(&mut self, now_ms: u64) {
        self.collect_replies();
        let output = self.session.advance(now_ms);
        self.dispatch(output, now_ms);
        self.frame.clear();
        self.session.render_frame(now_ms, &mut self.frame);
        self.stats.frames += 1;
    }

    /// Shut the session down and deliver whatever it still had queued.
    pub fn finish(&mut self, now_ms: u64) {
        let output = self.session.shutdown();
        self.dispatch(output, now_ms);
        if let Some(remote) = self.remote.take() {
            for completion in remote.shutdown() {
                if completion.result.is_err() {
                    self.stats.requests_failed += 1;
                }
            }
        }
    }

    fn collect_replies(&mut self) {
        let Some(remote) = &self.remote else {
            return;
        };
        for completion in remote.poll() {
            if completion.result.is_err() {
                self.stats.requests_failed += 1;
            }
            let (action, response) = completion.into_response();
            self.session.handle_response(action, response);
        }
    }

    fn dispatch(&mut self, output: StepOutput, now_ms: u64) {
        for event in output.events {
            self.on_event(&event, now_ms);
        }
        for request in output.requests {
            self.send(request);
        }
    }

    fn send(&mut self, request: GardenRequest) {
        let Some(remote) = &self.remote else {
            tracing::debug!(action = request.action().as_str(), "no endpoint, request dropped");
            return;
        };
        let action = request.action();
        match remote.send(request) {
            Ok(()) => self.stats.requests_sent += 1,
            Err(e) => {
                self.stats.requests_failed += 1;
                tracing::warn!(action = action.as_str(), error = %e, "could not queue request");
            }
        }
    }

    fn on_event(&mut self, event: &SessionEvent, now_ms: u64) {
        if self.print_events {
            match serde_json::to_string(event) {
                Ok(line) => {
                    let mut out = std::io::stdout().lock();
                    let _ = writeln!(out, "{line}");
                }
                Err(e) => tracing::warn!(error = %e, "could not encode event"),
            }
        }
        match event {
            // Stdin is always open, so "starting the recognizer" just means
            // accepting lines from now on.
            SessionEvent::StartListening => self.session.recognizer_started(now_ms),
            SessionEvent::PlantSprouted { id, mood, origin } => {
                tracing::info!(%id, %mood, ?origin, plants = self.session.garden().len(), "sprouted");
            }
            SessionEvent::CanvasResized { width, height, shifted_by } => {
                tracing::info!(width, height, shifted_by, "canvas resized");
            }
            SessionEvent::RemoteMerged { added, evicted } => {
                tracing::info!(added, evicted, "merged shared plants");
            }
            SessionEvent::EmailStatus { message, tone } if !message.is_empty() => {
                tracing::info!(?tone, "email: {message}");
            }
            SessionEvent::Audio(command) => {
                tracing::debug!(track = ?command.track, action = ?command.action, "audio");
            }
            other => tracing::debug!(event = ?other, "session event"),
        }
    }
}
