//! Trains: state, the advancement loop, and passenger exchange.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::info;
use tokio::sync::Semaphore;

use rail_core::{Baton, Closed, Flag, JunctionId, Lane, StationId, TrackId, TrainId, TrainSpec};
use rail_net::Ticket;

use crate::railway::{Fault, Railway, TRAIN_TASK_KEY};
use crate::worker::Whereabouts;

// ── Train ─────────────────────────────────────────────────────────────────────

/// A train: a cyclic route of junctions, a bounded pool of seats, and the
/// tickets currently honored aboard.
pub struct Train {
    pub id: TrainId,
    pub name: String,
    pub speed: u32,
    pub capacity: u32,
    pub repair_min: u32,
    /// Cyclic route; always at least two junctions.
    pub route: Vec<JunctionId>,
    /// Stations the route passes through.
    pub connects: Vec<StationId>,
    /// Last visited junction's offset into `route`.
    index: AtomicUsize,
    /// The track whose server currently hosts this train.
    position: AtomicU32,
    /// Seat pool; permits are forgotten on boarding and restored on alighting.
    pub seats: Semaphore,
    /// Tickets of passengers currently aboard.
    pub valid_tickets: Mutex<Vec<Ticket>>,
    /// Occupancy baton (see the crate docs).
    pub done: Baton,
    /// Repair completion signal.
    pub repaired: Lane<()>,
    /// Latched by the post-hop fault trial.
    pub broke: Flag,
}

impl Train {
    pub fn new(
        id: TrainId,
        spec: &TrainSpec,
        route: Vec<JunctionId>,
        connects: Vec<StationId>,
        initial: TrackId,
    ) -> Self {
        Self {
            id,
            name: spec.name.to_uppercase(),
            speed: spec.speed,
            capacity: spec.capacity,
            repair_min: spec.repair_min,
            route,
            connects,
            index: AtomicUsize::new(0),
            position: AtomicU32::new(initial.0),
            seats: Semaphore::new(spec.capacity as usize),
            valid_tickets: Mutex::new(Vec::new()),
            done: Baton::rendezvous(),
            repaired: Lane::rendezvous(),
            broke: Flag::new(),
        }
    }

    /// The track whose server currently hosts this train.
    pub fn position(&self) -> TrackId {
        TrackId(self.position.load(Ordering::Acquire))
    }

    pub(crate) fn set_position(&self, track: TrackId) {
        self.position.store(track.0, Ordering::Release);
    }

    pub fn route_index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// The junction pair of the current hop: last visited and next.
    pub fn connection(&self) -> (JunctionId, JunctionId) {
        let i = self.route_index();
        (self.route[i], self.route[(i + 1) % self.route.len()])
    }

    fn advance(&self) {
        let next = (self.route_index() + 1) % self.route.len();
        self.index.store(next, Ordering::Release);
    }

    pub fn repair_hours(&self) -> f64 {
        f64::from(self.repair_min) / 60.0
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Train{} {}", self.id.0, self.name)
    }
}

// ── Advancement loop ──────────────────────────────────────────────────────────

/// Drive one train forever: register on the first route junction, then hop
/// edge → junction around the route, interleaving self-fault handling.
pub async fn run_train(railway: Arc<Railway>, id: TrainId) {
    let train = railway.train(id);
    let net = &railway.network;
    let mut rng = railway.task_rng(TRAIN_TASK_KEY | u64::from(id.0));

    info!("{} {} starts work", railway.clock.now(), train);

    // Initial registration: a full rendezvous with the first route junction
    // puts our recorded position there before the loop starts.
    let first = net.junction_track(train.route[0]);
    if first.chan.rider.send(id).await.is_err() {
        return;
    }
    if complete_rendezvous(train, first).await.is_err() {
        return;
    }

    loop {
        // A pending self-fault is surfaced before the next hop; if no team
        // is listening the fault is dropped and the train keeps running.
        if train.broke.take() {
            if railway.repair.try_send(Fault::Train(id)) {
                info!("{} {} broke", railway.clock.now(), train);
                if train.repaired.recv().await.is_err() {
                    return;
                }
                info!("{} {} repaired", railway.clock.now(), train);
            }
            continue;
        }

        let (fst, snd) = train.connection();

        // Busy-scan the edges between the junction pair; the first server
        // with a parked select accepts us.
        'scan: loop {
            for &edge in net.topology.between(fst, snd) {
                let track = net.track(edge);
                if track.chan.rider.try_send(id) {
                    if complete_rendezvous(train, track).await.is_err() {
                        return;
                    }
                    break 'scan;
                }
            }
            tokio::task::yield_now().await;
        }

        // Enter the next junction; our route index advances exactly once per
        // junction rendezvous.
        let junction = net.junction_track(snd);
        if junction.chan.rider.send(id).await.is_err() {
            return;
        }
        train.advance();
        if complete_rendezvous(train, junction).await.is_err() {
            return;
        }

        if rng.chance(railway.fault.train) {
            train.broke.arm();
        }
    }
}

/// The rider's side of the handshake, after the server has taken our id:
/// receive the commit on our baton, receive the server's release, then send
/// the final acknowledgement that lets the server go back to its select.
async fn complete_rendezvous(train: &Train, track: &rail_net::Track) -> Result<(), Closed> {
    train.done.recv().await?;
    track.chan.done.recv().await?;
    train.done.send(()).await
}

// ── Passenger exchange ────────────────────────────────────────────────────────
//
// Runs inside the platform server's rendezvous, between the commit and the
// dwell sleep: everyone whose destination this station is gets off (freeing
// a seat and waking the worker), then queued ticket holders board FIFO for
// as long as seats remain.

pub(crate) async fn let_passengers_out(
    railway: &Railway,
    train: &Train,
    station: StationId,
) -> Result<(), Closed> {
    let leaving: Vec<Ticket> = {
        let mut valid = train
            .valid_tickets
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let mut leaving = Vec::new();
        valid.retain(|t| {
            if t.destination == station {
                leaving.push(*t);
                false
            } else {
                true
            }
        });
        leaving
    };

    for ticket in leaving {
        train.seats.add_permits(1);
        let worker = railway.worker(ticket.owner);
        info!(
            "{} gets off {} at {}",
            worker,
            train,
            railway.network.station(station)
        );
        worker.set_whereabouts(Whereabouts::AtStation(station));
        worker.done.send(()).await?;
    }
    Ok(())
}

pub(crate) fn validate_tickets(railway: &Railway, train: &Train, station: StationId) {
    let st = railway.network.station(station);
    loop {
        // Secure the seat first so an admitted ticket never bounces.
        let Ok(permit) = train.seats.try_acquire() else {
            break;
        };
        match st.next_ticket(train.id) {
            Some(ticket) => {
                permit.forget();
                let worker = railway.worker(ticket.owner);
                info!("{} gets on {} at {}", worker, train, st);
                worker.set_whereabouts(Whereabouts::Aboard(train.id));
                train
                    .valid_tickets
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(ticket);
            }
            None => break, // permit drops back into the pool
        }
    }
}
