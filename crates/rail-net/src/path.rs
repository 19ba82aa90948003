//! Corridor search for repair teams.
//!
//! A depth-first walk over [`Network::neighbors`] that only steps onto
//! tracks whose `available` hint is armed — i.e. tracks the caller managed
//! to reserve beforehand.  Consuming the hint on visit doubles as the
//! visited-set, so no explicit cycle check is needed: a track is never
//! stepped onto twice because its token is gone after the first visit.
//!
//! On reaching any destination the accumulated path (including the start
//! and the destination) is posted to the reply lane *non-blockingly*: if the
//! caller has already taken an answer from a sibling branch, later finds are
//! simply dropped.  The walk makes no attempt to be shortest — any corridor
//! through currently-reserved tracks suffices.

use rail_core::{Lane, TrackId};

use crate::network::Network;

/// Search for a corridor from `start` to any of `destinations`.
///
/// `start` itself is not availability-gated (the caller occupies it).  The
/// first discovered path is posted to `reply`; the function returns once the
/// reachable reserved region is exhausted.
pub fn search_corridor(
    net: &Network,
    start: TrackId,
    destinations: &[TrackId],
    reply: &Lane<Vec<TrackId>>,
) {
    walk(net, vec![start], start, destinations, reply);
}

fn walk(
    net: &Network,
    path: Vec<TrackId>,
    from: TrackId,
    destinations: &[TrackId],
    reply: &Lane<Vec<TrackId>>,
) {
    for next in net.neighbors(from) {
        if !net.track(next).take_available() {
            continue;
        }

        let mut candidate = path.clone();
        candidate.push(next);

        if destinations.contains(&next) {
            let _ = reply.try_send(candidate);
            return;
        }

        walk(net, candidate, next, destinations, reply);
    }
}
