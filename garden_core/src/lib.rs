// garden_core — the Listening Garden as a pure Rust library.
//
// Speech goes in, plants come out: each recognized utterance is scored for
// mood, turned into a procedurally drawn plant, and added to a shared,
// slowly weathering garden on a canvas that grows as plants crowd its edges.
// This crate holds all of that logic and none of the I/O. Microphones,
// windows, speakers and the network belong to the host (see `garden_cli`
// for a headless one), which talks to the garden through `GardenSession`.
//
// Module overview:
// - `session.rs`:   `GardenSession`, the context object hosts drive; job handlers.
// - `types.rs`:     `Mood`, `PlantId`, `Point`, `Rgba`.
// - `config.rs`:    `GardenConfig` and its parameter groups; JSON loading.
// - `emotion.rs`:   Keyword mood scoring and energy.
// - `plant_gen.rs`: Utterance → `PlantRecord` (height, complexity, position).
// - `visual.rs`:    `PlantRecord` → `ShapeGraph` (stem curve and blobs).
// - `palette.rs`:   Mood foliage and stem colors.
// - `plant.rs`:     `PlantRecord`, `ShapeGraph`, `Blob`, `StemCurve`.
// - `garden.rs`:    `GardenState`, the capacity-bounded plant store; remote merges.
// - `canvas.rs`:    `CanvasExtent`, grow-to-fit with the upward shift.
// - `weather.rs`:   Rainout / windblow drift and fade.
// - `audio.rs`:     `AmbientMixer`, bird and weather track cues.
// - `event.rs`:     Job queue (`EventQueue`, `TaskKind`) + host-visible `SessionEvent`s.
// - `render.rs`:    `Surface` trait, `DrawList`, per-frame painting.
// - `svg.rs`:       `SvgSurface` for snapshots.
// - `prng`:         Re-exported from `garden_prng`.
//
// **Determinism.** Every random choice draws from the session's seeded
// `GardenRng` and every timestamp comes from the host, so a seed plus an
// input timeline reproduces a garden exactly. The one hash container
// (`GardenState`'s id index) is only ever queried, never iterated.

pub mod audio;
pub mod canvas;
pub mod config;
pub mod emotion;
pub mod event;
pub mod garden;
pub mod palette;
pub mod plant;
pub mod plant_gen;
pub use garden_prng as prng;
pub mod render;
pub mod session;
pub mod svg;
pub mod types;
pub mod visual;
pub mod weather;

pub use config::{ConfigError, GardenConfig};
pub use event::{SessionEvent, StatusTone, TaskKind};
pub use render::{DrawList, DrawOp, Surface};
pub use session::{GardenSession, StepOutput};
pub use svg::SvgSurface;
pub use types::{Mood, PlantId, Point, Rgba};
