//! Track resources and their rendezvous endpoints.
//!
//! The three resource kinds share one protocol and differ only in action
//! duration and side effects, so they are one struct with a kind tag.  The
//! capability set — rendezvous endpoints, `reserve` / `cancel` /
//! `take_available`, action duration, endpoint lookup — is the inherent impl
//! of [`Track`]; the server loops that *drive* the endpoints live in
//! `rail-sim`.

use std::fmt;

use rail_core::{Baton, Closed, Flag, JunctionId, Lane, StationId, TeamId, TrackId, TrainId};

// ── TrackKind ─────────────────────────────────────────────────────────────────

/// What kind of resource a [`Track`] is.
#[derive(Debug)]
pub enum TrackKind {
    /// A travel edge with a length and a speed limit.
    Segment { length_km: u32, speed_limit: u32 },

    /// A dwell edge belonging to a station.  The endpoints may coincide.
    Platform {
        name: String,
        dwell_min: u32,
        station: StationId,
    },

    /// A rotating node connecting edges.
    Junction {
        junction: JunctionId,
        rotate_min: u32,
    },
}

// ── TrackChannels ─────────────────────────────────────────────────────────────

/// The rendezvous endpoints of one track.
///
/// All lanes are zero-capacity; `available` and `broke` are single-slot
/// flags.  The whole bundle mirrors the protocol of §"resource rendezvous":
/// regular riders and team riders send their id, the server answers on the
/// rider's baton and its own `done`, reservations ride the `reserved` /
/// `cancelled` pair, and faults latch `broke` until the server manages to
/// enqueue itself for repair.
#[derive(Debug)]
pub struct TrackChannels {
    /// Regular rider (train) rendezvous endpoint.
    pub rider: Lane<TrainId>,
    /// Repair-team rendezvous endpoint.
    pub team_rider: Lane<TeamId>,
    /// The track's completion signal, received by the current rider.
    pub done: Baton,
    /// Reservation endpoint; accepted only while the server is free.
    pub reserved: Lane<()>,
    /// Reservation cancellation endpoint.
    pub cancelled: Lane<()>,
    /// Best-effort "reserved and walkable" hint consumed by the path search.
    pub available: Flag,
    /// Latched by the post-rendezvous fault trial.
    pub broke: Flag,
    /// Repair completion signal, sent by a repair team.
    pub repaired: Lane<()>,
}

impl TrackChannels {
    fn new() -> Self {
        Self {
            rider: Lane::rendezvous(),
            team_rider: Lane::rendezvous(),
            done: Baton::rendezvous(),
            reserved: Lane::rendezvous(),
            cancelled: Lane::rendezvous(),
            available: Flag::new(),
            broke: Flag::new(),
            repaired: Lane::rendezvous(),
        }
    }
}

// ── Track ─────────────────────────────────────────────────────────────────────

/// One railway resource: static geometry plus live endpoints.
#[derive(Debug)]
pub struct Track {
    pub id: TrackId,
    pub first: JunctionId,
    pub second: JunctionId,
    pub repair_min: u32,
    pub kind: TrackKind,
    pub chan: TrackChannels,
}

impl Track {
    pub fn segment(
        id: TrackId,
        length_km: u32,
        speed_limit: u32,
        repair_min: u32,
        first: JunctionId,
        second: JunctionId,
    ) -> Self {
        Self {
            id,
            first,
            second,
            repair_min,
            kind: TrackKind::Segment {
                length_km,
                speed_limit,
            },
            chan: TrackChannels::new(),
        }
    }

    pub fn platform(
        id: TrackId,
        name: String,
        dwell_min: u32,
        repair_min: u32,
        first: JunctionId,
        second: JunctionId,
        station: StationId,
    ) -> Self {
        Self {
            id,
            first,
            second,
            repair_min,
            kind: TrackKind::Platform {
                name: name.to_uppercase(),
                dwell_min,
                station,
            },
            chan: TrackChannels::new(),
        }
    }

    pub fn junction(id: TrackId, junction: JunctionId, rotate_min: u32, repair_min: u32) -> Self {
        Self {
            id,
            first: junction,
            second: junction,
            repair_min,
            kind: TrackKind::Junction {
                junction,
                rotate_min,
            },
            chan: TrackChannels::new(),
        }
    }

    // ── Kind queries ──────────────────────────────────────────────────────

    pub fn is_platform(&self) -> bool {
        matches!(self.kind, TrackKind::Platform { .. })
    }

    pub fn is_junction(&self) -> bool {
        matches!(self.kind, TrackKind::Junction { .. })
    }

    /// The owning station, for platforms.
    pub fn station(&self) -> Option<StationId> {
        match self.kind {
            TrackKind::Platform { station, .. } => Some(station),
            _ => None,
        }
    }

    // ── Durations ─────────────────────────────────────────────────────────

    /// How long a rendezvous on this track lasts, in simulated hours, for an
    /// agent with the given top speed.
    ///
    /// Segments divide length by the slower of the limit and the agent;
    /// platforms and junctions have fixed dwell/rotate times and ignore the
    /// agent's speed.
    pub fn action_hours(&self, speed: u32) -> f64 {
        match self.kind {
            TrackKind::Segment {
                length_km,
                speed_limit,
            } => f64::from(length_km) / f64::from(speed_limit.min(speed).max(1)),
            TrackKind::Platform { dwell_min, .. } => f64::from(dwell_min) / 60.0,
            TrackKind::Junction { rotate_min, .. } => f64::from(rotate_min) / 60.0,
        }
    }

    /// How long a repair of this track takes, in simulated hours.
    pub fn repair_hours(&self) -> f64 {
        f64::from(self.repair_min) / 60.0
    }

    // ── Reservation capability ────────────────────────────────────────────

    /// Try to reserve this track.
    ///
    /// Succeeds only while the server is free (parked at its select point).
    /// On success the `available` hint is armed for the path search.
    pub fn reserve(&self) -> bool {
        if self.chan.reserved.try_send(()) {
            self.chan.available.arm();
            true
        } else {
            false
        }
    }

    /// Release a reservation previously obtained with [`Track::reserve`].
    ///
    /// Parks until the server acknowledges.  A stale `available` token is
    /// deliberately left behind: the hint is best-effort and a consumer
    /// finding the track free again is harmless.
    pub async fn cancel(&self) -> Result<(), Closed> {
        self.chan.cancelled.send(()).await
    }

    /// Consume the `available` hint if armed.  Once taken it must not be
    /// re-read until the track has gone through a fresh reservation.
    pub fn take_available(&self) -> bool {
        self.chan.available.take()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TrackKind::Segment { .. } => write!(f, "Segment{}", self.id.0),
            TrackKind::Platform { name, .. } => write!(f, "Platform{} {}", self.id.0, name),
            TrackKind::Junction { junction, .. } => write!(f, "Junction{}", junction.0),
        }
    }
}
