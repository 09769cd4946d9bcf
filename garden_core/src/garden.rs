// The garden: every plant currently alive, oldest first.
//
// `GardenState` is an insertion-ordered `VecDeque<PlantRecord>` plus an
// `FxHashSet<PlantId>` index of the ids it holds. The two are only mutated
// together, so `ids.len() == plants.len()` always and the garden never holds
// two plants with the same id.
//
// Capacity is a hard cap (700 by default). A local insertion that overflows
// evicts exactly one plant, the oldest. A remote merge appends its whole
// batch first and then trims the overshoot from the front in one go, so a
// very large batch can push out some of its own earlier members.
//
// Remote plants are converted here (`record_from_remote`) because the
// defaults they need (random position, fallback height and complexity)
// depend on the canvas and config. Merging never grows the canvas: remote
// plants keep the sender's coordinates even if they fall outside this
// client's extent.
//
// See also: `plant.rs` for `PlantRecord`, `canvas.rs` which calls
// `shift_all_y()`, `session.rs` which feeds both insertion paths.

use crate::canvas::CanvasExtent;
use crate::config::GardenConfig;
use crate::plant::{PlantOrigin, PlantRecord};
use crate::plant_gen;
use crate::types::{Mood, PlantId};
use crate::visual;
use garden_prng::GardenRng;
use garden_protocol::RemotePlant;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Fallbacks for fields a remote plant may omit.
const REMOTE_DEFAULT_HEIGHT: f64 = 160.0;
const REMOTE_DEFAULT_COMPLEXITY: f64 = 2.0;
const REMOTE_DEFAULT_CONFIDENCE: f64 = 0.8;
const REMOTE_DEFAULT_ENERGY: f64 = 0.4;

/// What a remote merge changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOutcome {
    /// Ids appended, in batch order (including any trimmed right away).
    pub added: Vec<PlantId>,
    /// Plants dropped by the post-merge trim, oldest first.
    pub evicted: Vec<PlantRecord>,
}

/// Result of a local insertion.
#[derive(Clone, Debug, PartialEq)]
pub enum Insertion {
    /// Stored; `evicted` is the oldest plant if the garden overflowed.
    Inserted { evicted: Option<PlantRecord> },
    /// The id was already present; the record is handed back untouched.
    Duplicate(PlantRecord),
}

/// Ordered, capacity-bounded plant store.
#[derive(Clone, Debug)]
pub struct GardenState {
    plants: VecDeque<PlantRecord>,
    ids: FxHashSet<PlantId>,
    capacity: usize,
}

impl GardenState {
    /// An empty garden holding at most `capacity` plants (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            plants: VecDeque::with_capacity(capacity + 1),
            ids: FxHashSet::default(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn contains(&self, id: &PlantId) -> bool {
        self.ids.contains(id)
    }

    /// Plants oldest first (draw order).
    pub fn iter(&self) -> impl Iterator<Item = &PlantRecord> {
        self.plants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlantRecord> {
        self.plants.iter_mut()
    }

    pub fn get(&self, id: &PlantId) -> Option<&PlantRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.plants.iter().find(|p| &p.id == id)
    }

    /// The most recently inserted plant.
    pub fn newest(&self) -> Option<&PlantRecord> {
        self.plants.back()
    }

    /// Append a locally generated plant. If the garden overflows, the oldest
    /// plant is evicted. A record whose id is already present is handed back
    /// without touching the garden.
    pub fn insert_local(&mut self, record: PlantRecord) -> Insertion {
        if self.ids.contains(&record.id) {
            tracing::debug!(id = %record.id, "duplicate local plant id dropped");
            return Insertion::Duplicate(record);
        }
        self.ids.insert(record.id.clone());
        self.plants.push_back(record);
        let evicted = if self.plants.len() > self.capacity {
            self.pop_oldest()
        } else {
            None
        };
        Insertion::Inserted { evicted }
    }

    /// Merge a batch of remote plants. Plants without a usable id, or whose
    /// id is already present (including earlier in the same batch), are
    /// skipped. Each new plant gets defaults for missing fields and its shape
    /// graph before it is appended; the overshoot is trimmed once at the end.
    pub fn merge_remote(
        &mut self,
        remote: &[RemotePlant],
        canvas: &CanvasExtent,
        config: &GardenConfig,
        rng: &mut GardenRng,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for rp in remote {
            let Some(id) = rp.identity().and_then(PlantId::from_remote) else {
                continue;
            };
            if self.ids.contains(&id) {
                continue;
            }
            let mut record = record_from_remote(id, rp, canvas, config, rng);
            visual::ensure_visual(&mut record, rng);
            self.ids.insert(record.id.clone());
            outcome.added.push(record.id.clone());
            self.plants.push_back(record);
        }

        while self.plants.len() > self.capacity {
            if let Some(evicted) = self.pop_oldest() {
                outcome.evicted.push(evicted);
            }
        }

        if !outcome.added.is_empty() {
            tracing::debug!(
                added = outcome.added.len(),
                evicted = outcome.evicted.len(),
                total = self.plants.len(),
                "merged remote plants"
            );
        }
        outcome
    }

    /// Majority mood over all stored plants; ties go to the earlier mood in
    /// `Mood::ALL`, and an empty garden is neutral.
    pub fn dominant_mood(&self) -> Mood {
        let mut counts = [0usize; 5];
        for plant in &self.plants {
            counts[plant.mood as usize] += 1;
        }
        let mut best = (Mood::Neutral, 0usize);
        for mood in Mood::ALL {
            let count = counts[mood as usize];
            if count > best.1 {
                best = (mood, count);
            }
        }
        best.0
    }

    /// Move every plant down by `dy` (canvas grew upward).
    pub fn shift_all_y(&mut self, dy: f64) {
        for plant in &mut self.plants {
            plant.shift_y(dy);
        }
    }

    fn pop_oldest(&mut self) -> Option<PlantRecord> {
        let evicted = self.plants.pop_front()?;
        self.ids.remove(&evicted.id);
        Some(evicted)
    }
}

/// Build a record from a remote plant, filling in what it omits.
pub fn record_from_remote(
    id: PlantId,
    rp: &RemotePlant,
    canvas: &CanvasExtent,
    config: &GardenConfig,
    rng: &mut GardenRng,
) -> PlantRecord {
    let (x, y) = match (rp.x, rp.y) {
        (Some(x), Some(y)) => (x, y),
        (x, y) => {
            let (rx, ry) = plant_gen::random_position(canvas, &config.canvas, rng);
            (x.unwrap_or(rx), y.unwrap_or(ry))
        }
    };
    let complexity = rp
        .complexity
        .unwrap_or(REMOTE_DEFAULT_COMPLEXITY)
        .round()
        .clamp(1.0, f64::from(config.growth.max_complexity.max(1))) as u8;
    let confidence = rp
        .confidence
        .filter(|c| (0.0..=1.0).contains(c))
        .unwrap_or(REMOTE_DEFAULT_CONFIDENCE);
    let energy = rp
        .energy
        .filter(|e| e.is_finite())
        .map_or(REMOTE_DEFAULT_ENERGY, |e| e.clamp(0.0, 1.0));

    PlantRecord {
        id,
        x,
        y,
        height: rp.height.unwrap_or(REMOTE_DEFAULT_HEIGHT),
        complexity,
        text: rp.text.clone().unwrap_or_default(),
        confidence,
        mood: rp.mood.as_deref().map_or(Mood::Neutral, Mood::parse_lenient),
        energy,
        alpha: 1.0,
        drift_x: 0.0,
        drift_y: 0.0,
        origin: PlantOrigin::Remote,
        visual: None,
    }
}
