//! Repair teams: the arbiter loop that clears a corridor to a fault.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::info;
use tokio::time::sleep;

use rail_core::{Baton, Lane, TeamId, TrackId};
use rail_net::search_corridor;

use crate::railway::{Fault, Railway};

// ── RepairTeam ────────────────────────────────────────────────────────────────

/// A repair team dispatched from a home platform (its depot).
pub struct RepairTeam {
    pub id: TeamId,
    pub speed: u32,
    /// The depot platform.
    pub home: TrackId,
    /// The track whose server currently hosts this team.
    position: AtomicU32,
    /// Occupancy baton (see the crate docs).
    pub done: Baton,
}

impl RepairTeam {
    pub fn new(id: TeamId, speed: u32, home: TrackId) -> Self {
        Self {
            id,
            speed,
            home,
            position: AtomicU32::new(home.0),
            done: Baton::rendezvous(),
        }
    }

    pub fn position(&self) -> TrackId {
        TrackId(self.position.load(Ordering::Acquire))
    }

    pub(crate) fn set_position(&self, track: TrackId) {
        self.position.store(track.0, Ordering::Release);
    }
}

impl fmt::Display for RepairTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepairTeam{}", self.id.0)
    }
}

// ── Arbiter loop ──────────────────────────────────────────────────────────────

/// Drive one repair team forever.
///
/// Occupies the depot, then for each fault drained from the central repair
/// lane: reserve the network, find a corridor to a neighbor of the fault,
/// release the surplus, walk out, repair, walk back.
pub async fn run_team(railway: Arc<Railway>, id: TeamId) {
    let team = railway.team(id);
    let net = &railway.network;
    let home = net.track(team.home);

    // Register at the depot: one full team-rider rendezvous puts our
    // recorded position there.
    if home.chan.team_rider.send(id).await.is_err() {
        return;
    }
    if complete_rendezvous(team, home).await.is_err() {
        return;
    }

    loop {
        let Ok(client) = railway.repair.recv().await else {
            return;
        };
        info!(
            "{} {} prepares to repair {}",
            railway.clock.now(),
            team,
            railway.fault_label(client)
        );

        let destinations = railway.fault_neighbors(client);

        // ── Short-circuit: the fault is adjacent to the depot ─────────────
        if destinations.contains(&team.home) {
            info!(
                "{} {} repairs {} from depot",
                railway.clock.now(),
                team,
                railway.fault_label(client)
            );
            sleep(railway.clock.wall_duration(railway.fault_repair_hours(client))).await;
            railway.signal_repaired(client).await;
            continue;
        }

        // ── Blanket reservation ───────────────────────────────────────────
        //
        // Opportunistic: occupied or already-reserved tracks are skipped.
        // Whatever was captured is the region the path search may walk.
        // The depot is skipped too — a corridor must leave home, not loop
        // back through it.
        let client_track = match client {
            Fault::Track(t) => Some(t),
            Fault::Train(_) => None,
        };
        let mut reserved: Vec<TrackId> = Vec::new();
        for track in &net.tracks {
            if Some(track.id) == client_track || track.id == team.home {
                continue;
            }
            if track.reserve() {
                reserved.push(track.id);
            }
        }

        // ── Corridor search ───────────────────────────────────────────────
        //
        // If the reserved region does not reach any destination the search
        // posts nothing and we park here holding our reservations — the
        // acknowledged partitioning hazard.
        let reply: Lane<Vec<TrackId>> = Lane::rendezvous();
        {
            let railway = railway.clone();
            let reply = reply.clone();
            let destinations = destinations.clone();
            let start = team.home;
            tokio::spawn(async move {
                search_corridor(&railway.network, start, &destinations, &reply);
            });
        }
        let Ok(path) = reply.recv().await else {
            return;
        };

        let mut listing = format!(
            "{} {} found path to faulty {}:",
            railway.clock.now(),
            team,
            railway.fault_label(client)
        );
        for (i, hop) in path.iter().enumerate() {
            listing.push_str(&format!("\n{}. {}", i, net.track(*hop)));
        }
        info!("{listing}");

        // ── Release surplus reservations ──────────────────────────────────
        for &held in &reserved {
            if !path.contains(&held) {
                if net.track(held).cancel().await.is_err() {
                    return;
                }
            }
        }

        // ── Walk the corridor out ─────────────────────────────────────────
        for &hop in &path[1..] {
            let track = net.track(hop);
            if track.chan.team_rider.send(id).await.is_err() {
                return;
            }
            if complete_rendezvous(team, track).await.is_err() {
                return;
            }
        }

        // ── Repair from the corridor's end ────────────────────────────────
        if let Some(&site) = path.last() {
            info!(
                "{} {} repairs {} from {}",
                railway.clock.now(),
                team,
                railway.fault_label(client),
                net.track(site)
            );
        }
        sleep(railway.clock.wall_duration(railway.fault_repair_hours(client))).await;
        railway.signal_repaired(client).await;

        // ── Walk back home ────────────────────────────────────────────────
        //
        // The intermediate hops in reverse.  Junctions have no twins and are
        // taken directly; for edges any sibling sharing both endpoints will
        // do, so a parallel track can cover for one that is now occupied.
        for &hop in path[1..path.len() - 1].iter().rev() {
            let track = net.track(hop);
            if track.is_junction() {
                if track.chan.team_rider.send(id).await.is_err() {
                    return;
                }
                if complete_rendezvous(team, track).await.is_err() {
                    return;
                }
            } else {
                'scan: loop {
                    for &twin in net.siblings(hop) {
                        let candidate = net.track(twin);
                        if candidate.chan.team_rider.try_send(id) {
                            if complete_rendezvous(team, candidate).await.is_err() {
                                return;
                            }
                            break 'scan;
                        }
                    }
                    tokio::task::yield_now().await;
                }
            }
        }

        // ── Final rendezvous with the depot ───────────────────────────────
        if home.chan.team_rider.send(id).await.is_err() {
            return;
        }
        if complete_rendezvous(team, home).await.is_err() {
            return;
        }
        info!("{} {} returned to depot", railway.clock.now(), team);
    }
}

/// The team's side of the handshake: commit on our baton, the track's
/// release, then our final acknowledgement.
async fn complete_rendezvous(
    team: &RepairTeam,
    track: &rail_net::Track,
) -> Result<(), rail_core::Closed> {
    team.done.recv().await?;
    track.chan.done.recv().await?;
    team.done.send(()).await
}
