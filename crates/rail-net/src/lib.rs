//! `rail-net` — the static railway network and its rendezvous endpoints.
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`track`]    | `Track` (segment / platform / junction) + channel bundle  |
//! | [`topology`] | Junction-pair multiset adjacency graph                    |
//! | [`station`]  | `Station`, `Ticket`, per-train ticket queues              |
//! | [`network`]  | `Network` registry + validating builder                   |
//! | [`path`]     | Availability-gated DFS corridor search                    |
//!
//! The crate knows nothing about trains, teams, or workers beyond their
//! typed ids: everything that flows through a track's channels is an id, and
//! the live agents behind those ids are owned by `rail-sim`.

pub mod error;
pub mod network;
pub mod path;
pub mod station;
pub mod topology;
pub mod track;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NetError, NetResult};
pub use network::{build_network, Network};
pub use path::search_corridor;
pub use station::{Station, Ticket};
pub use topology::Topology;
pub use track::{Track, TrackChannels, TrackKind};
