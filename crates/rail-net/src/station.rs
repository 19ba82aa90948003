//! Stations: named platform clusters with per-train ticket queues.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use rail_core::{JunctionId, StationId, TrackId, TrainId, WorkerId};

// ── Ticket ────────────────────────────────────────────────────────────────────

/// A booked seat claim: created on booking, carried in the station queue
/// until admission, then in the train's valid list until alighting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub owner: WorkerId,
    pub departure: StationId,
    pub destination: StationId,
    pub train: TrainId,
}

// ── Station ───────────────────────────────────────────────────────────────────

/// A named cluster of platforms sharing the same endpoint-junction pair.
///
/// The `tickets` mutex is the single lock of §"worker itinerary": both
/// booking (workers) and admission (platform servers) go through it, so the
/// FIFO order of each per-train queue is the boarding order.
#[derive(Debug)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub first: JunctionId,
    pub second: JunctionId,
    /// Member platforms, in registration order.
    pub platforms: Vec<TrackId>,
    /// Workers whose home this station is.
    pub residents: Vec<WorkerId>,
    /// Trains whose route passes this station.
    pub trains: Vec<TrainId>,
    tickets: Mutex<HashMap<TrainId, VecDeque<Ticket>>>,
}

impl Station {
    /// A new station seeded with its first platform.
    pub fn new(
        id: StationId,
        name: String,
        first: JunctionId,
        second: JunctionId,
        initial_platform: TrackId,
    ) -> Self {
        Self {
            id,
            name,
            first,
            second,
            platforms: vec![initial_platform],
            residents: Vec::new(),
            trains: Vec::new(),
            tickets: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this station sits between junctions `a` and `b`, in either
    /// orientation.
    pub fn connects(&self, a: JunctionId, b: JunctionId) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }

    /// Append a ticket to the queue for its train.
    pub fn book(&self, ticket: Ticket) {
        let mut queues = self.tickets.lock().unwrap_or_else(|e| e.into_inner());
        queues.entry(ticket.train).or_default().push_back(ticket);
    }

    /// Pop the longest-waiting ticket for `train`, if any.
    ///
    /// Callers secure a seat *before* popping so a ticket never has to be
    /// pushed back.
    pub fn next_ticket(&self, train: TrainId) -> Option<Ticket> {
        let mut queues = self.tickets.lock().unwrap_or_else(|e| e.into_inner());
        queues.get_mut(&train).and_then(VecDeque::pop_front)
    }

    /// Number of tickets currently queued for `train`.
    pub fn queued_for(&self, train: TrainId) -> usize {
        let queues = self.tickets.lock().unwrap_or_else(|e| e.into_inner());
        queues.get(&train).map_or(0, VecDeque::len)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station{} {}", self.id.0, self.name)
    }
}
