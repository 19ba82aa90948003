//! Task launch.

use std::sync::Arc;

use tokio::task::JoinHandle;

use rail_core::{TeamId, TrackId, TrainId, WorkerId};

use crate::dispatch::run_dispatcher;
use crate::railway::Railway;
use crate::server::serve_track;
use crate::team::run_team;
use crate::train::run_train;
use crate::worker::run_worker;

/// Which optional subsystems to run.
#[derive(Copy, Clone, Debug, Default)]
pub struct LaunchOptions {
    /// Spawn repair teams.  Without them, faults are rolled but every
    /// repair enqueue fails and the breakage is dropped.
    pub repairs: bool,
    /// Spawn workers and the job dispatcher.
    pub workers: bool,
}

/// Spawn the whole simulation: one server per track, then the repair teams
/// (so they occupy their depots before traffic builds up), then the trains,
/// then the workers and their dispatcher.
///
/// Returns the train task handles — the only tasks whose termination is
/// meaningful to await, and they run until the process exits.
pub fn launch(railway: &Arc<Railway>, opts: LaunchOptions) -> Vec<JoinHandle<()>> {
    for i in 0..railway.network.tracks.len() {
        tokio::spawn(serve_track(railway.clone(), TrackId(i as u32)));
    }

    if opts.repairs {
        for i in 0..railway.teams.len() {
            tokio::spawn(run_team(railway.clone(), TeamId(i as u32)));
        }
    }

    let trains = (0..railway.trains.len())
        .map(|i| tokio::spawn(run_train(railway.clone(), TrainId(i as u32))))
        .collect();

    if opts.workers {
        for i in 0..railway.workers.len() {
            tokio::spawn(run_worker(railway.clone(), WorkerId(i as u32)));
        }
        tokio::spawn(run_dispatcher(railway.clone()));
    }

    trains
}
