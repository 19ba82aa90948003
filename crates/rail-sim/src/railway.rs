//! The railway registry: everything the tasks share, and its assembly.
//!
//! The registry is built once from a [`Scenario`], wrapped in an `Arc`, and
//! handed to every task.  No entity owns another: tracks and stations live
//! in the network, agents live in flat vectors here, and every
//! cross-reference is a typed id resolved through the registry.

use std::sync::Arc;

use rail_core::{
    FaultProfile, JunctionId, Scenario, SimClock, StationId, TeamId, TrackId, TrainId, WorkerId,
};
use rail_core::{Lane, SimRng};
use rail_net::{build_network, Network, Track};

use crate::error::{SimError, SimResult};
use crate::events::{event_channel, PassageKind, TrafficEvent};
use crate::team::RepairTeam;
use crate::train::Train;
use crate::worker::Worker;

// ── Task-key ranges for per-task RNG derivation ───────────────────────────────
//
// Tracks use their raw id; the other ranges are offset so no two tasks share
// a derived seed.

pub(crate) const TRAIN_TASK_KEY: u64 = 1 << 32;
pub(crate) const DISPATCH_TASK_KEY: u64 = 1 << 33;

// ── Fault ─────────────────────────────────────────────────────────────────────

/// A broken entity enqueued on the central repair lane.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Fault {
    Track(TrackId),
    Train(TrainId),
}

// ── Railway ───────────────────────────────────────────────────────────────────

/// The assembled world shared by all tasks.
pub struct Railway {
    pub clock: SimClock,
    pub fault: FaultProfile,
    pub seed: u64,
    pub network: Network,
    pub trains: Vec<Train>,
    pub teams: Vec<RepairTeam>,
    pub workers: Vec<Worker>,
    /// Central repair queue: resources and trains enqueue themselves with a
    /// non-blocking send; repair teams drain it.
    pub repair: Lane<Fault>,
    events: flume::Sender<TrafficEvent>,
}

impl Railway {
    /// Build the full registry from a parsed scenario.
    ///
    /// Validates every cross-reference; returns the registry plus the
    /// receiving end of the traffic-event stream for the statistics writer.
    pub fn assemble(
        scenario: &Scenario,
        fault: FaultProfile,
    ) -> SimResult<(Arc<Railway>, flume::Receiver<TrafficEvent>)> {
        scenario.params.validate()?;
        let mut network = build_network(
            &scenario.junctions,
            &scenario.segments,
            &scenario.platforms,
        )?;

        let junction_count = scenario.junctions.len();
        let platform_base = junction_count + scenario.segments.len();
        let platform_track = |what: &'static str, index: u32| -> SimResult<TrackId> {
            if (index as usize) < scenario.platforms.len() {
                Ok(TrackId((platform_base + index as usize) as u32))
            } else {
                Err(SimError::Reference {
                    what,
                    index: index as usize,
                    len: scenario.platforms.len(),
                })
            }
        };

        // ── Trains ────────────────────────────────────────────────────────
        let mut trains = Vec::with_capacity(scenario.trains.len());
        for (i, spec) in scenario.trains.iter().enumerate() {
            if spec.route.len() < 2 {
                return Err(SimError::ShortRoute {
                    train: spec.id,
                    len: spec.route.len(),
                });
            }
            let mut route = Vec::with_capacity(spec.route.len());
            for &j in &spec.route {
                if j as usize >= junction_count {
                    return Err(SimError::Reference {
                        what: "train route junction",
                        index: j as usize,
                        len: junction_count,
                    });
                }
                route.push(JunctionId(j));
            }

            // Every consecutive hop needs at least one connecting edge, or
            // the busy-scan would spin forever.
            let id = TrainId(i as u32);
            let mut connects: Vec<StationId> = Vec::new();
            for (k, &fst) in route.iter().enumerate() {
                let snd = route[(k + 1) % route.len()];
                if network.topology.between(fst, snd).is_empty() {
                    return Err(SimError::RouteGap {
                        train: spec.id,
                        first: fst.0,
                        second: snd.0,
                    });
                }
                for station in &network.stations {
                    if station.connects(fst, snd) && !connects.contains(&station.id) {
                        connects.push(station.id);
                    }
                }
            }
            for &station in &connects {
                network.register_train(station, id);
            }

            let initial = network.junctions[route[0].index()];
            trains.push(Train::new(id, spec, route, connects, initial));
        }

        // ── Repair teams ──────────────────────────────────────────────────
        let mut teams = Vec::with_capacity(scenario.teams.len());
        for (i, spec) in scenario.teams.iter().enumerate() {
            let home = platform_track("repair-team home platform", spec.home_platform)?;
            teams.push(RepairTeam::new(TeamId(i as u32), spec.speed, home));
        }

        // ── Workers ───────────────────────────────────────────────────────
        let mut workers = Vec::with_capacity(scenario.workers.len());
        for (i, spec) in scenario.workers.iter().enumerate() {
            let home_track = platform_track("worker home platform", spec.home_platform)?;
            let station = match network.track(home_track).station() {
                Some(s) => s,
                None => {
                    return Err(SimError::Reference {
                        what: "worker home platform",
                        index: spec.home_platform as usize,
                        len: scenario.platforms.len(),
                    })
                }
            };
            let id = WorkerId(i as u32);
            let name = network.station(station).name.clone();
            network.stations[station.index()].residents.push(id);
            workers.push(Worker::new(id, station, name));
        }

        let (events, events_rx) = event_channel();
        let railway = Railway {
            clock: SimClock::new(&scenario.params),
            fault,
            seed: scenario.params.seed,
            network,
            trains,
            teams,
            workers,
            repair: Lane::rendezvous(),
            events,
        };
        Ok((Arc::new(railway), events_rx))
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn train(&self, id: TrainId) -> &Train {
        &self.trains[id.index()]
    }

    #[inline]
    pub fn team(&self, id: TeamId) -> &RepairTeam {
        &self.teams[id.index()]
    }

    #[inline]
    pub fn worker(&self, id: WorkerId) -> &Worker {
        &self.workers[id.index()]
    }

    /// Per-task RNG, seeded from the run's master seed.
    pub(crate) fn task_rng(&self, stream: u64) -> SimRng {
        SimRng::stream(self.seed, stream)
    }

    // ── Fault dispatch helpers ────────────────────────────────────────────

    /// Human-readable label of the broken entity.
    pub fn fault_label(&self, fault: Fault) -> String {
        match fault {
            Fault::Track(t) => self.network.track(t).to_string(),
            Fault::Train(t) => self.train(t).to_string(),
        }
    }

    /// The tracks a repair team must reach to service `fault`: the broken
    /// track's own neighbors, or for a broken train the neighbors of the
    /// track it currently occupies.
    pub fn fault_neighbors(&self, fault: Fault) -> Vec<TrackId> {
        match fault {
            Fault::Track(t) => self.network.neighbors(t),
            Fault::Train(t) => self.network.neighbors(self.train(t).position()),
        }
    }

    /// Repair duration in simulated hours.
    pub fn fault_repair_hours(&self, fault: Fault) -> f64 {
        match fault {
            Fault::Track(t) => self.network.track(t).repair_hours(),
            Fault::Train(t) => self.train(t).repair_hours(),
        }
    }

    /// Wake the broken entity up again.  Parks until it acknowledges.
    pub async fn signal_repaired(&self, fault: Fault) {
        let _ = match fault {
            Fault::Track(t) => self.network.track(t).chan.repaired.send(()).await,
            Fault::Train(t) => self.train(t).repaired.send(()).await,
        };
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Emit a statistics event.  Blocks while the event channel is full;
    /// a missing consumer (tests without a writer) drops the event.
    pub(crate) async fn emit(&self, kind: PassageKind, train: &Train, platform: &Track) {
        let event = TrafficEvent {
            kind,
            train: train.to_string(),
            platform: platform.to_string(),
            at: self.clock.now(),
        };
        let _ = self.events.send_async(event).await;
    }
}
