//! `rail-io` — the thin I/O shell around the simulation core.
//!
//! | Module     | Contents                                       |
//! |------------|------------------------------------------------|
//! | [`loader`] | Line-oriented scenario file parser             |
//! | [`stats`]  | Statistics writer fed by the traffic stream    |
//! | [`dot`]    | Graphviz topology exporter                     |
//!
//! Nothing in here has concurrent invariants of its own: the loader runs
//! before any task exists, the exporter is a pure function of the network,
//! and the statistics writer is the single consumer of the event channel.

pub mod dot;
pub mod error;
pub mod loader;
pub mod stats;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dot::render_dot;
pub use error::{IoError, IoResult};
pub use loader::{load_scenario, read_scenario};
pub use stats::write_stream;
