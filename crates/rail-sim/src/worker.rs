//! Commuting workers, their jobs, and the work barrier.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::info;
use tokio::sync::Barrier;
use tokio::time::sleep;

use rail_core::{Baton, Closed, Lane, StationId, TrainId, WorkerId};
use rail_net::Ticket;

use crate::railway::Railway;

// ── Job ───────────────────────────────────────────────────────────────────────

/// A joint job: a roster of workers meets at a workplace station, works for
/// a fixed duration, and disperses home.
///
/// The barrier is the "all arrived, start work" gate: sized to the roster,
/// it releases everyone together once the last worker reaches the
/// workplace.
pub struct Job {
    pub duration_min: u32,
    pub workplace: StationId,
    pub roster: Vec<WorkerId>,
    pub barrier: Barrier,
}

impl Job {
    pub fn new(duration_min: u32, workplace: StationId, roster: Vec<WorkerId>) -> Self {
        let barrier = Barrier::new(roster.len());
        Self {
            duration_min,
            workplace,
            roster,
            barrier,
        }
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// Where a worker currently is.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Whereabouts {
    AtStation(StationId),
    Aboard(TrainId),
}

/// A resident worker, driven by jobs arriving on its job lane.
pub struct Worker {
    pub id: WorkerId,
    pub home: StationId,
    home_name: String,
    /// Woken by a platform server when our ticket's destination is reached.
    pub done: Baton,
    /// Job assignments from the dispatcher.
    pub jobs: Lane<Arc<Job>>,
    whereabouts: Mutex<Whereabouts>,
    /// Set by the dispatcher on assignment, cleared on homecoming; only
    /// idle workers are rostered so a job's barrier can always fill.
    pub busy: AtomicBool,
}

impl Worker {
    pub fn new(id: WorkerId, home: StationId, home_name: String) -> Self {
        Self {
            id,
            home,
            home_name,
            done: Baton::rendezvous(),
            jobs: Lane::rendezvous(),
            whereabouts: Mutex::new(Whereabouts::AtStation(home)),
            busy: AtomicBool::new(false),
        }
    }

    pub fn whereabouts(&self) -> Whereabouts {
        *self.whereabouts.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_whereabouts(&self, w: Whereabouts) {
        *self.whereabouts.lock().unwrap_or_else(|e| e.into_inner()) = w;
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker{} from {}", self.id.0, self.home_name)
    }
}

// ── Itinerary planning ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Itinerary {
    /// One train serves both stations.
    Direct(TrainId),
    /// Out on `first` to the interchange, on to the destination on `second`.
    Change {
        first: TrainId,
        via: StationId,
        second: TrainId,
    },
}

/// Find a way from `from` to `to`: a direct train if any, otherwise the
/// first train pair meeting at a shared interchange station.
pub(crate) fn plan_itinerary(railway: &Railway, from: StationId, to: StationId) -> Option<Itinerary> {
    let depart = &railway.network.station(from).trains;
    let arrive = &railway.network.station(to).trains;

    for t in depart {
        if arrive.contains(t) {
            return Some(Itinerary::Direct(*t));
        }
    }

    for &first in depart {
        for &via in &railway.train(first).connects {
            for &second in arrive {
                if railway.train(second).connects.contains(&via) {
                    return Some(Itinerary::Change { first, via, second });
                }
            }
        }
    }

    None
}

// ── Worker loop ───────────────────────────────────────────────────────────────

/// Drive one worker forever: wait for a job, commute, work behind the
/// barrier, commute home (same trains, reversed), go idle again.
pub async fn run_worker(railway: Arc<Railway>, id: WorkerId) {
    let worker = railway.worker(id);

    loop {
        let Ok(job) = worker.jobs.recv().await else {
            return;
        };
        info!(
            "{} {} goes to work at {} for {}m",
            railway.clock.now(),
            worker,
            railway.network.station(job.workplace),
            job.duration_min
        );

        match plan_itinerary(&railway, worker.home, job.workplace) {
            Some(Itinerary::Direct(train)) => {
                if travel(&railway, worker, train, worker.home, job.workplace)
                    .await
                    .is_err()
                {
                    return;
                }
                work(&railway, worker, &job).await;
                if travel(&railway, worker, train, job.workplace, worker.home)
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Some(Itinerary::Change { first, via, second }) => {
                let legs = [
                    (first, worker.home, via),
                    (second, via, job.workplace),
                ];
                for (train, from, to) in legs {
                    if travel(&railway, worker, train, from, to).await.is_err() {
                        return;
                    }
                }
                work(&railway, worker, &job).await;
                let legs = [
                    (second, job.workplace, via),
                    (first, via, worker.home),
                ];
                for (train, from, to) in legs {
                    if travel(&railway, worker, train, from, to).await.is_err() {
                        return;
                    }
                }
            }
            None => {
                info!(
                    "{} {} found no connection to {}",
                    railway.clock.now(),
                    worker,
                    railway.network.station(job.workplace)
                );
            }
        }

        info!("{} {} returned from work", railway.clock.now(), worker);
        worker.busy.store(false, Ordering::Release);
    }
}

/// Book one leg and ride it: append a ticket to the departure station's
/// queue for `train`, then park until the platform server at the
/// destination wakes us.
async fn travel(
    railway: &Railway,
    worker: &Worker,
    train: TrainId,
    from: StationId,
    to: StationId,
) -> Result<(), Closed> {
    railway.network.station(from).book(Ticket {
        owner: worker.id,
        departure: from,
        destination: to,
        train,
    });
    info!(
        "{} got ticket for {}[{} -> {}]",
        worker,
        railway.train(train),
        railway.network.station(from),
        railway.network.station(to)
    );
    worker.done.recv().await?;
    Ok(())
}

/// The workplace phase: arrive at the barrier, and once the whole roster is
/// through, work for the job's scaled duration.
async fn work(railway: &Railway, worker: &Worker, job: &Job) {
    job.barrier.wait().await;
    info!("{} {} is working...", railway.clock.now(), worker);
    sleep(
        railway
            .clock
            .wall_duration(f64::from(job.duration_min) / 60.0),
    )
    .await;
    info!("{} {} leaves work", railway.clock.now(), worker);
}
