//! `rail-sim` — the live simulation built on `rail-net`'s endpoints.
//!
//! # Task model
//!
//! One long-lived tokio task per track resource and per mobile agent.  All
//! coordination is rendezvous on the zero-capacity lanes owned by the
//! resources and agents; the only other shared state is the central repair
//! lane, the bounded traffic-event channel, and the per-station ticket
//! mutexes.
//!
//! # The rendezvous handshake
//!
//! Every mobile agent owns a baton (its `done` lane).  A rendezvous is a
//! double handshake: the agent sends itself to an endpoint; the server
//! *commits* by sending on the agent's baton (before which it takes no
//! externally visible action); the server performs the side effects and the
//! scaled sleep, sends on its own `done`, and finally receives the agent's
//! acknowledgement on the baton before returning to its select point.  The
//! agent is "inside" the resource from commit to final ack, which is what
//! makes occupancy single and position handover atomic — and because the
//! whole exchange is self-contained, a parked `try_send` probe on any
//! endpoint answers exactly the question "is this resource free right now".
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`railway`]   | `Railway` registry, assembly, `Fault`               |
//! | [`server`]    | Track server select loops                           |
//! | [`train`]     | Train advancement loop + passenger exchange         |
//! | [`team`]      | Repair-team arbiter loop                            |
//! | [`worker`]    | Worker itineraries, jobs, the work barrier          |
//! | [`dispatch`]  | Random job dispatcher                               |
//! | [`events`]    | Traffic-event stream consumed by the stats writer   |
//! | [`orchestrate`] | Task launch                                       |

pub mod dispatch;
pub mod error;
pub mod events;
pub mod orchestrate;
pub mod railway;
pub mod server;
pub mod team;
pub mod train;
pub mod worker;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use events::{PassageKind, TrafficEvent};
pub use orchestrate::{launch, LaunchOptions};
pub use railway::{Fault, Railway};
pub use train::Train;
pub use worker::{Job, Whereabouts, Worker};
