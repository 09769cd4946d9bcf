// Session timers and host-visible events.
//
// The garden runs a handful of recurring jobs (idle sprouts, remote polls,
// weather, the email popup, the daily snapshot). Instead of independent
// timers, each job is a `ScheduledEvent` in one priority queue ordered by
// `(at_ms, sequence)`. The host calls `GardenSession::advance(now)`, which
// pops and runs everything due, and each recurring job reschedules itself.
// Jobs never fire early; a host that stalls gets each overdue job once, not
// once per missed period.
//
// This file defines two related but distinct concepts:
// - `ScheduledEvent` / `TaskKind`: internal jobs in the queue.
// - `SessionEvent`: what happened, emitted to the host (UI and audio cues).
//
// See also: `session.rs` for the handlers of every `TaskKind`.

use crate::audio::AudioCommand;
use crate::plant::PlantOrigin;
use crate::types::{Mood, PlantId};
use crate::weather::WeatherMode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Internal scheduled jobs (priority queue)
// ---------------------------------------------------------------------------

/// A job due at (or after) `at_ms`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Epoch milliseconds at which the job becomes due.
    pub at_ms: u64,
    /// Tiebreak for jobs due at the same millisecond; lower runs first.
    pub sequence: u64,
    pub kind: TaskKind,
}

/// The session's jobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Plant a synthetic utterance so a quiet room still grows.
    IdleSprout,
    /// Ask the endpoint for the shared garden.
    RemotePoll,
    /// Start a random weather effect, then pick the next trigger time.
    WeatherCheck,
    /// Offer the email signup (once, unless already saved).
    EmailPopup,
    /// Start listening once the activation time has passed.
    ListenCheck,
    /// Restart a recognizer that stopped on its own.
    RestartListening,
    /// Close the popup after a successful signup.
    HidePopup,
    /// Upload a snapshot of the canvas shortly after local midnight.
    MidnightSnapshot,
}

// Min-heap on (at_ms, sequence) on top of the max-heap `BinaryHeap`.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at_ms == other.at_ms && self.sequence == other.sequence
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at_ms
            .cmp(&self.at_ms)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Pending jobs, earliest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at_ms: u64, kind: TaskKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent {
            at_ms,
            sequence,
            kind,
        });
    }

    /// When the next job is due.
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.at_ms)
    }

    /// Pop the next job if it is due by `now_ms`.
    pub fn pop_if_ready(&mut self, now_ms: u64) -> Option<ScheduledEvent> {
        if self.heap.peek().is_some_and(|e| e.at_ms <= now_ms) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Whether a job of this kind is pending.
    pub fn has_pending(&self, kind: TaskKind) -> bool {
        self.heap.iter().any(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

// ---------------------------------------------------------------------------
// Host-visible events (output)
// ---------------------------------------------------------------------------

/// Tone of an email popup status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTone {
    Neutral,
    Success,
    Error,
}

/// Something the host should show, play, or start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PlantSprouted {
        id: PlantId,
        mood: Mood,
        origin: PlantOrigin,
    },
    RemoteMerged {
        added: usize,
        evicted: usize,
    },
    /// The canvas changed size; `shifted_by` is how far everything moved down.
    CanvasResized {
        width: f64,
        height: f64,
        shifted_by: f64,
    },
    WeatherStarted {
        mode: WeatherMode,
        dominant: Mood,
    },
    WeatherEnded {
        mode: WeatherMode,
    },
    Audio(AudioCommand),
    /// The host should (re)start its speech recognizer.
    StartListening,
    ShowEmailPopup,
    HideEmailPopup,
    EmailStatus {
        message: String,
        tone: StatusTone,
    },
    /// Remember that this visitor signed up; the popup will not return.
    EmailSaved,
}
