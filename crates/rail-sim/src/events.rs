//! The traffic-event stream.
//!
//! Platform servers emit one event per arrival; junction servers emit one
//! per observed departure (a train entering a junction from a platform).
//! Events flow over a bounded channel to the statistics writer in `rail-io`,
//! which renders them one per line.

use std::fmt;

use rail_core::ClockTime;

/// Which side of a platform visit an event records.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PassageKind {
    /// Train arrived at the platform (`>-`).
    Arrived,
    /// Train departed the platform, observed on its next junction entry (`->`).
    Departed,
}

/// One statistics line.
#[derive(Clone, Debug)]
pub struct TrafficEvent {
    pub kind: PassageKind,
    pub train: String,
    pub platform: String,
    pub at: ClockTime,
}

impl fmt::Display for TrafficEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.kind {
            PassageKind::Arrived => ">-",
            PassageKind::Departed => "->",
        };
        write!(f, "{} {} {}\t{}", self.train, self.at, arrow, self.platform)
    }
}

/// How many events may be in flight before emitters start blocking.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Create the many-producer single-consumer event channel.
pub fn event_channel() -> (flume::Sender<TrafficEvent>, flume::Receiver<TrafficEvent>) {
    flume::bounded(EVENT_CHANNEL_CAPACITY)
}
