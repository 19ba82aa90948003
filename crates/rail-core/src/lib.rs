//! `rail-core` — foundational types for the railsim workspace.
//!
//! This crate is a dependency of every other `rail-*` crate.  It intentionally
//! has no `rail-*` dependencies and minimal external ones (`flume`, `rand`,
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `JunctionId`, `TrackId`, `StationId`, `TrainId`, …      |
//! | [`time`]     | `SimClock`, `ClockTime` (wall time → simulated HH:MM:SS)|
//! | [`config`]   | `SimParams` and the parsed `Scenario` description       |
//! | [`rng`]      | `SimRng` (deterministic per-task RNG)                   |
//! | [`fault`]    | `FaultProfile` breakage probabilities                   |
//! | [`sync`]     | `Lane`, `Flag`, `Baton` rendezvous channel primitives   |
//! | [`error`]    | `CoreError`, `CoreResult`                               |

pub mod config;
pub mod error;
pub mod fault;
pub mod ids;
pub mod rng;
pub mod sync;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    JunctionSpec, PlatformSpec, Scenario, SegmentSpec, SimParams, TeamSpec, TrainSpec, WorkerSpec,
};
pub use error::{CoreError, CoreResult};
pub use fault::FaultProfile;
pub use ids::{JunctionId, StationId, TeamId, TrackId, TrainId, WorkerId};
pub use rng::SimRng;
pub use sync::{Baton, Closed, Flag, Lane};
pub use time::{ClockTime, SimClock};
