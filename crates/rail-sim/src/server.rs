//! Track server loops.
//!
//! Every track runs [`serve_track`] for the lifetime of the process.  Each
//! iteration parks in a `select!` over the mutually exclusive protocol
//! events; whichever fires is handled to completion before the server
//! returns to the select point.  This single loop is the linearization
//! point of everything that happens on the track.

use std::sync::Arc;

use log::info;
use tokio::time::sleep;

use rail_core::{Closed, TeamId, TrackId, TrainId};
use rail_net::{Track, TrackKind};

use crate::railway::{Fault, Railway};
use crate::train::{let_passengers_out, validate_tickets};
use crate::{events::PassageKind, team::RepairTeam};

/// What a team-rider rendezvous should call the move, for the log line.
fn team_verb(track: &Track) -> &'static str {
    match track.kind {
        TrackKind::Segment { .. } => "travels along",
        TrackKind::Platform { .. } => "waits on",
        TrackKind::Junction { .. } => "rotates at",
    }
}

/// Serve one track forever.
pub async fn serve_track(railway: Arc<Railway>, id: TrackId) {
    let track = railway.network.track(id);
    let fault_p = match track.kind {
        TrackKind::Segment { .. } => railway.fault.segment,
        TrackKind::Platform { .. } => railway.fault.platform,
        TrackKind::Junction { .. } => railway.fault.junction,
    };
    let mut rng = railway.task_rng(u64::from(id.0));

    loop {
        tokio::select! {
            // ── Broken: hand ourselves to the repair subsystem ────────────
            //
            // The enqueue is non-blocking; with no team parked on the repair
            // lane the fault is dropped and service continues.
            Ok(()) = track.chan.broke.wait() => {
                if railway.repair.try_send(Fault::Track(id)) {
                    info!("{} {} broke", railway.clock.now(), track);
                    if track.chan.repaired.recv().await.is_err() {
                        return;
                    }
                    info!("{} {} repaired", railway.clock.now(), track);
                }
            }

            // ── Reserved: wait for cancel or the reserving team ───────────
            Ok(()) = track.chan.reserved.recv() => {
                info!("{} {} is reserved", railway.clock.now(), track);
                tokio::select! {
                    Ok(()) = track.chan.cancelled.recv() => {
                        info!("{} {} reservation cancelled", railway.clock.now(), track);
                    }
                    Ok(team) = track.chan.team_rider.recv() => {
                        if host_team(&railway, track, team, true).await.is_err() {
                            return;
                        }
                    }
                    else => return,
                }
            }

            // ── Regular rider ─────────────────────────────────────────────
            Ok(train) = track.chan.rider.recv() => {
                match host_train(&railway, track, train).await {
                    Ok(()) => {
                        if rng.chance(fault_p) {
                            track.chan.broke.arm();
                        }
                    }
                    Err(Closed) => return,
                }
            }

            // ── Team rider on a free track ────────────────────────────────
            Ok(team) = track.chan.team_rider.recv() => {
                if host_team(&railway, track, team, false).await.is_err() {
                    return;
                }
            }

            else => return,
        }
    }
}

// ── Rendezvous bodies ─────────────────────────────────────────────────────────

/// Host a train for one rendezvous: commit on the rider's baton, side
/// effects, scaled sleep, release on our own `done`, then wait for the
/// rider's final acknowledgement before returning to the select point.
async fn host_train(railway: &Railway, track: &Track, id: TrainId) -> Result<(), Closed> {
    let train = railway.train(id);

    // Commit.  From here to the rider's final ack, the train is "inside"
    // this track and nobody else can be.
    train.done.send(()).await?;

    match &track.kind {
        TrackKind::Platform { station, .. } => {
            railway.emit(PassageKind::Arrived, train, track).await;
            train.set_position(track.id);
            info!("{} {} waits on {}", railway.clock.now(), train, track);
            let_passengers_out(railway, train, *station).await?;
            validate_tickets(railway, train, *station);
        }
        TrackKind::Junction { .. } => {
            // A train entering a junction from a platform has, by that very
            // move, departed the platform: record it.
            let prev = railway.network.track(train.position());
            if prev.is_platform() {
                railway.emit(PassageKind::Departed, train, prev).await;
            }
            train.set_position(track.id);
            info!("{} {} rotates at {}", railway.clock.now(), train, track);
        }
        TrackKind::Segment { .. } => {
            train.set_position(track.id);
            info!("{} {} travels along {}", railway.clock.now(), train, track);
        }
    }

    sleep(railway.clock.wall_duration(track.action_hours(train.speed))).await;

    track.chan.done.send(()).await?;
    train.done.recv().await?;
    Ok(())
}

/// Host a repair team for one rendezvous.  Same handshake as
/// [`host_train`], but without passenger exchange, statistics, or a fault
/// trial.
async fn host_team(
    railway: &Railway,
    track: &Track,
    id: TeamId,
    reserved: bool,
) -> Result<(), Closed> {
    let team: &RepairTeam = railway.team(id);

    team.done.send(()).await?;

    team.set_position(track.id);
    info!(
        "{} {} {} {}{}",
        railway.clock.now(),
        team,
        team_verb(track),
        if reserved { "reserved " } else { "" },
        track
    );

    sleep(railway.clock.wall_duration(track.action_hours(team.speed))).await;

    track.chan.done.send(()).await?;
    team.done.recv().await?;
    Ok(())
}
