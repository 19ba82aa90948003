//! Random job dispatcher.
//!
//! Jobs come from outside the worker protocol; this task is that outside.
//! At a scaled random cadence it rosters a few idle workers, picks a
//! workplace station and a duration, and hands the job down each rostered
//! worker's job lane.  Only idle workers are rostered — a job's barrier must
//! be able to fill, and a mid-commute worker cannot take a second job.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::info;
use tokio::time::sleep;

use rail_core::StationId;

use crate::railway::{Railway, DISPATCH_TASK_KEY};
use crate::worker::{plan_itinerary, Job};

/// Largest roster a single job may have.
const ROSTER_MAX: usize = 3;

/// Dispatch cadence bounds, in simulated hours.
const INTERVAL_HOURS: std::ops::Range<f64> = 1.0..4.0;

/// Job duration bounds, in simulated minutes.
const DURATION_MIN: std::ops::RangeInclusive<u32> = 60..=480;

/// Invent jobs forever.  Exits immediately if there is nobody to employ.
pub async fn run_dispatcher(railway: Arc<Railway>) {
    if railway.workers.is_empty() || railway.network.stations.is_empty() {
        return;
    }
    let mut rng = railway.task_rng(DISPATCH_TASK_KEY);

    loop {
        sleep(railway.clock.wall_duration(rng.roll(INTERVAL_HOURS))).await;

        let workplace = StationId(rng.roll(0..railway.network.stations.len() as u32));

        // A job's barrier only releases once the whole roster arrives, so
        // every rostered worker must be idle *and* able to reach the site.
        let idle: Vec<_> = railway
            .workers
            .iter()
            .filter(|w| !w.busy.load(Ordering::Acquire))
            .filter(|w| plan_itinerary(&railway, w.home, workplace).is_some())
            .map(|w| w.id)
            .collect();
        if idle.is_empty() {
            continue;
        }

        let want = rng.roll(1..=ROSTER_MAX);
        let roster = rng.sample(idle, want);

        let job = Arc::new(Job::new(
            rng.roll(DURATION_MIN),
            workplace,
            roster.clone(),
        ));
        info!(
            "{} job at {} for {}m, roster of {}",
            railway.clock.now(),
            railway.network.station(workplace),
            job.duration_min,
            job.roster.len()
        );

        for &id in &roster {
            let worker = railway.worker(id);
            worker.busy.store(true, Ordering::Release);
            if worker.jobs.send(job.clone()).await.is_err() {
                return;
            }
        }
    }
}
