//! Protocol tests for the live simulation.
//!
//! All scenarios run with `seconds_per_hour = 0` (every scaled sleep is
//! zero-length) and a zeroed fault profile unless the test is about faults,
//! so outcomes depend only on the protocol, not on timing.  Every await on
//! simulation progress goes through a generous timeout so a protocol
//! regression fails instead of hanging the suite.

use std::sync::Arc;
use std::time::Duration;

use rail_core::{
    FaultProfile, JunctionSpec, PlatformSpec, Scenario, SegmentSpec, SimParams, StationId, TeamSpec,
    TrackId, TrainId, TrainSpec, WorkerId, WorkerSpec,
};
use rail_net::Ticket;

use crate::events::{PassageKind, TrafficEvent};
use crate::orchestrate::{launch, LaunchOptions};
use crate::railway::Railway;
use crate::server::serve_track;
use crate::train::run_train;
use crate::worker::{plan_itinerary, Itinerary, Whereabouts};

// ── Scenario helpers ──────────────────────────────────────────────────────────

fn params() -> SimParams {
    SimParams {
        seconds_per_hour: 0,
        clock_hour: 0,
        clock_minute: 0,
        seed: 42,
    }
}

fn junction(id: u32) -> JunctionSpec {
    JunctionSpec {
        id,
        rotate_min: 6,
        repair_min: 60,
    }
}

fn segment(id: u32, first: u32, second: u32) -> SegmentSpec {
    SegmentSpec {
        id,
        length_km: 100,
        speed_limit: 100,
        repair_min: 60,
        first,
        second,
    }
}

fn platform(id: u32, name: &str, first: u32, second: u32) -> PlatformSpec {
    PlatformSpec {
        id,
        name: name.into(),
        dwell_min: 6,
        repair_min: 60,
        first,
        second,
    }
}

fn train(id: u32, capacity: u32, name: &str, route: &[u32]) -> TrainSpec {
    TrainSpec {
        id,
        speed: 100,
        capacity,
        repair_min: 60,
        name: name.into(),
        route: route.to_vec(),
    }
}

fn scenario(
    junctions: Vec<JunctionSpec>,
    segments: Vec<SegmentSpec>,
    platforms: Vec<PlatformSpec>,
    trains: Vec<TrainSpec>,
) -> Scenario {
    Scenario {
        params: params(),
        junctions,
        segments,
        platforms,
        teams: Vec::new(),
        trains,
        workers: Vec::new(),
    }
}

/// Two junctions with a single platform between them and one looping train:
/// every hop crosses the platform, so the event stream is fully determined.
fn ring_scenario(capacity: u32) -> Scenario {
    scenario(
        vec![junction(0), junction(1)],
        vec![],
        vec![platform(0, "alpha", 0, 1)],
        vec![train(0, capacity, "express", &[0, 1])],
    )
}

async fn next_event(rx: &flume::Receiver<TrafficEvent>) -> TrafficEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv_async())
        .await
        .expect("timed out waiting for a traffic event")
        .expect("event channel closed")
}

async fn wait_for(mut cond: impl FnMut() -> bool, what: &str) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

// ── Train loop and statistics (S1/S2) ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn train_loops_and_statistics_alternate() {
    let (railway, events) = Railway::assemble(&ring_scenario(0), FaultProfile::none()).unwrap();
    launch(&railway, LaunchOptions::default());

    // Arrival and departure lines must strictly alternate, starting with an
    // arrival: >-, ->, >-, -> …
    for i in 0..6 {
        let event = next_event(&events).await;
        let expected = if i % 2 == 0 {
            PassageKind::Arrived
        } else {
            PassageKind::Departed
        };
        assert_eq!(event.kind, expected, "event {i} out of order: {event}");
        assert_eq!(event.train, "Train0 EXPRESS");
        assert_eq!(event.platform, "Platform2 ALPHA");
    }

    // Route progress: the index is always the last visited junction's offset.
    assert!(railway.train(TrainId(0)).route_index() < 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn event_lines_render_like_the_statistics_file() {
    let (railway, events) = Railway::assemble(&ring_scenario(0), FaultProfile::none()).unwrap();
    launch(&railway, LaunchOptions::default());

    let event = next_event(&events).await;
    let line = event.to_string();
    assert!(
        line.starts_with("Train0 EXPRESS ") && line.contains(" >-\tPlatform2 ALPHA"),
        "unexpected line: {line:?}"
    );
}

// ── Contention (S5) ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn opposed_trains_on_shared_edge_both_make_progress() {
    let mut s = ring_scenario(0);
    s.trains.push(train(1, 0, "local", &[1, 0]));
    let (railway, events) = Railway::assemble(&s, FaultProfile::none()).unwrap();
    launch(&railway, LaunchOptions::default());

    // The single platform serializes the two trains; within a bounded number
    // of events both must have completed platform visits.
    let mut seen = [false, false];
    for _ in 0..40 {
        let event = next_event(&events).await;
        if event.train.starts_with("Train0") {
            seen[0] = true;
        } else {
            seen[1] = true;
        }
        if seen == [true, true] {
            return;
        }
    }
    panic!("one of the contending trains starved: {seen:?}");
}

// ── Reservation round-trip ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reserve_cancel_leaves_track_serviceable() {
    let s = scenario(
        vec![junction(0), junction(1)],
        vec![segment(0, 0, 1)],
        vec![],
        vec![train(0, 0, "probe", &[0, 1])],
    );
    let (railway, _events) = Railway::assemble(&s, FaultProfile::none()).unwrap();
    // Servers only; the train agent is driven by hand below.
    for i in 0..railway.network.tracks.len() {
        tokio::spawn(serve_track(railway.clone(), TrackId(i as u32)));
    }

    let track = railway.network.track(TrackId(2));
    wait_for(|| track.reserve(), "the segment server to accept a reservation").await;
    assert!(track.take_available());
    track.cancel().await.unwrap();

    // Free again: a rider rendezvous must now be accepted.
    let probe = railway.train(TrainId(0));
    wait_for(|| track.chan.rider.try_send(TrainId(0)), "the rider probe").await;
    probe.done.recv().await.unwrap();
    track.chan.done.recv().await.unwrap();
    probe.done.send(()).await.unwrap();

    // And reservable again after that.
    wait_for(|| track.reserve(), "a second reservation").await;
    track.cancel().await.unwrap();
}

// ── Breakage and repair (S3) ──────────────────────────────────────────────────

/// Triangle with a depot platform as the only 0↔1 edge (so the resident
/// train crosses it every hop) and segments closing the cycle via junction
/// 2, which is off the train's route: its fault handling is driven purely
/// by the repair team.
fn triangle_with_depot() -> Scenario {
    let mut s = scenario(
        vec![junction(0), junction(1), junction(2)],
        vec![segment(0, 1, 2), segment(1, 0, 2)],
        vec![platform(0, "depot", 0, 1)],
        vec![train(0, 0, "express", &[0, 1])],
    );
    s.teams.push(TeamSpec {
        id: 0,
        speed: 100,
        home_platform: 0,
    });
    s
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn team_walks_corridor_to_remote_fault_and_returns() {
    // No trains: on a quiet network the blanket reservation captures every
    // track and the corridor is fully determined.
    let mut s = triangle_with_depot();
    s.trains.clear();
    let (railway, _events) = Railway::assemble(&s, FaultProfile::none()).unwrap();
    launch(
        &railway,
        LaunchOptions {
            repairs: true,
            workers: false,
        },
    );

    // Let the team finish its depot registration and park on the repair
    // lane, then break junction 2 (not adjacent to the depot, so the team
    // has to travel).
    tokio::time::sleep(Duration::from_millis(100)).await;
    let faulty = railway.network.track(TrackId(2));
    faulty.chan.broke.arm();

    let team = railway.team(rail_core::TeamId(0));
    wait_for(
        || team.position() != team.home,
        "the team to leave its depot",
    )
    .await;
    wait_for(
        || team.position() == team.home,
        "the team to return to its depot",
    )
    .await;

    // The repaired junction must serve again: its reservation endpoint only
    // answers from a free select point.
    wait_for(|| faulty.reserve(), "the repaired junction to serve again").await;
    faulty.cancel().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn depot_adjacent_fault_repaired_without_travel() {
    let (railway, events) = Railway::assemble(&triangle_with_depot(), FaultProfile::none()).unwrap();
    launch(
        &railway,
        LaunchOptions {
            repairs: true,
            workers: false,
        },
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Junction 0 is adjacent to the depot platform: short-circuit repair.
    railway.network.track(TrackId(0)).chan.broke.arm();

    // Traffic through junction 0 stalls while it is broken and resumes
    // after the depot repair; seeing several more platform arrivals proves
    // the break-repair round trip completed.
    let mut arrivals = 0;
    while arrivals < 5 {
        if next_event(&events).await.kind == PassageKind::Arrived {
            arrivals += 1;
        }
    }
    assert_eq!(
        railway.team(rail_core::TeamId(0)).position(),
        railway.team(rail_core::TeamId(0)).home,
        "a depot-adjacent repair must not move the team"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn faults_are_dropped_when_no_team_listens() {
    // Everything breaks constantly, but with no repair teams every enqueue
    // fails and the trains keep running regardless.
    let profile = FaultProfile {
        segment: 0.0,
        platform: 1.0,
        junction: 1.0,
        train: 0.0,
    };
    let (railway, events) = Railway::assemble(&ring_scenario(0), profile).unwrap();
    launch(&railway, LaunchOptions::default());

    for _ in 0..8 {
        next_event(&events).await;
    }
}

// ── Seats and tickets (S4) ────────────────────────────────────────────────────

/// Three stations on a line served by one train, with two workers living at
/// the first.  Track ids: 0..=2 junctions, 3 = loop-back segment, 4 = ALPHA,
/// 5 = BETA.
fn commuter_scenario(capacity: u32, workers: u32) -> Scenario {
    let mut s = scenario(
        vec![junction(0), junction(1), junction(2)],
        vec![segment(0, 2, 0)],
        vec![platform(0, "alpha", 0, 1), platform(1, "beta", 1, 2)],
        vec![train(0, capacity, "shuttle", &[0, 1, 2])],
    );
    s.workers = (0..workers)
        .map(|id| WorkerSpec {
            id,
            home_platform: 0,
        })
        .collect();
    s
}

// S4: a capacity-1 train admits exactly one of two queued ticket holders.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn capacity_bounds_admission_fifo() {
    // Real time scale (1 s per simulated hour) so the aboard window is wide
    // enough to observe; the whole round trip still takes a few seconds.
    let mut s = commuter_scenario(1, 2);
    s.params.seconds_per_hour = 1;
    let (railway, events) = Railway::assemble(&s, FaultProfile::none()).unwrap();
    // Nobody reads the statistics here; drain them so emitters never block.
    tokio::spawn(async move { while events.recv_async().await.is_ok() {} });

    let alpha = StationId(0);
    let beta = StationId(1);
    for worker in [0, 1] {
        railway.network.station(alpha).book(Ticket {
            owner: WorkerId(worker),
            departure: alpha,
            destination: beta,
            train: TrainId(0),
        });
    }

    // Stand-ins for the parked worker tasks: each just consumes the wake-ups
    // its alightings produce.
    for worker in [0u32, 1] {
        let railway = railway.clone();
        tokio::spawn(async move {
            while railway.worker(WorkerId(worker)).done.recv().await.is_ok() {}
        });
    }

    // Servers + the train, but no worker/dispatcher tasks: the bookings
    // above are the whole demand.
    for i in 0..railway.network.tracks.len() {
        tokio::spawn(serve_track(railway.clone(), TrackId(i as u32)));
    }
    tokio::spawn(run_train(railway.clone(), TrainId(0)));

    let train = railway.train(TrainId(0));
    let w0 = railway.worker(WorkerId(0));
    let w1 = railway.worker(WorkerId(1));

    // First ALPHA visit: exactly one seat, so exactly the first booker boards.
    wait_for(
        || w0.whereabouts() == Whereabouts::Aboard(TrainId(0)),
        "the first booker to board",
    )
    .await;
    assert_eq!(
        w1.whereabouts(),
        Whereabouts::AtStation(alpha),
        "the second booker must stay queued while the only seat is taken"
    );
    assert!(
        train
            .valid_tickets
            .lock()
            .unwrap()
            .len()
            <= 1,
        "valid tickets may never exceed capacity"
    );

    // Both eventually arrive: the seat frees at BETA and the second booker
    // boards on the next cycle.
    wait_for(
        || {
            w0.whereabouts() == Whereabouts::AtStation(beta)
                && w1.whereabouts() == Whereabouts::AtStation(beta)
        },
        "both workers to reach their destination",
    )
    .await;
    assert!(train.valid_tickets.lock().unwrap().is_empty());
}

// ── Itineraries and the job barrier (S6) ──────────────────────────────────────

/// Two overlapping train lines for interchange planning:
/// line A serves ALPHA and XCHG, line B serves XCHG and GAMMA.
fn two_line_scenario() -> Scenario {
    scenario(
        vec![junction(0), junction(1), junction(2), junction(3), junction(4)],
        vec![segment(0, 2, 0), segment(1, 4, 1)],
        vec![
            platform(0, "alpha", 0, 1),
            platform(1, "xchg", 1, 2),
            platform(2, "gamma", 2, 3),
            platform(3, "delta", 3, 4),
        ],
        vec![
            train(0, 8, "aline", &[0, 1, 2]),
            train(1, 8, "bline", &[1, 2, 3, 4]),
        ],
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn itinerary_planning_prefers_direct() {
    let (railway, _events) = Railway::assemble(&two_line_scenario(), FaultProfile::none()).unwrap();

    // ALPHA → XCHG: train 0 serves both.
    assert_eq!(
        plan_itinerary(&railway, StationId(0), StationId(1)),
        Some(Itinerary::Direct(TrainId(0)))
    );
    // ALPHA → GAMMA: no shared train; change at XCHG.
    assert_eq!(
        plan_itinerary(&railway, StationId(0), StationId(2)),
        Some(Itinerary::Change {
            first: TrainId(0),
            via: StationId(1),
            second: TrainId(1),
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn itinerary_planning_reports_unreachable() {
    let mut s = two_line_scenario();
    s.junctions.push(junction(5));
    s.platforms.push(platform(4, "island", 5, 5));
    let (railway, _events) = Railway::assemble(&s, FaultProfile::none()).unwrap();

    assert_eq!(plan_itinerary(&railway, StationId(0), StationId(4)), None);
}

// S6: the barrier holds the roster together; afterwards everyone is home.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn job_roster_meets_works_and_returns_home() {
    let mut s = two_line_scenario();
    // One worker at each of ALPHA, XCHG, GAMMA; the job site is XCHG.
    s.workers = vec![
        WorkerSpec {
            id: 0,
            home_platform: 0,
        },
        WorkerSpec {
            id: 1,
            home_platform: 1,
        },
        WorkerSpec {
            id: 2,
            home_platform: 2,
        },
    ];
    let (railway, events) = Railway::assemble(&s, FaultProfile::none()).unwrap();
    // Nobody reads the statistics here; drain them so emitters never block.
    tokio::spawn(async move { while events.recv_async().await.is_ok() {} });

    // Servers, trains, and the workers — but no dispatcher: the job below
    // is the only one in the world.
    for i in 0..railway.network.tracks.len() {
        tokio::spawn(serve_track(railway.clone(), TrackId(i as u32)));
    }
    for i in 0..railway.trains.len() {
        tokio::spawn(run_train(railway.clone(), TrainId(i as u32)));
    }
    for i in 0..railway.workers.len() {
        tokio::spawn(crate::worker::run_worker(railway.clone(), WorkerId(i as u32)));
    }

    let roster = vec![WorkerId(0), WorkerId(1), WorkerId(2)];
    let job = Arc::new(crate::worker::Job::new(60, StationId(1), roster.clone()));
    for &id in &roster {
        let worker = railway.worker(id);
        worker.busy.store(true, std::sync::atomic::Ordering::Release);
        worker.jobs.send(job.clone()).await.unwrap();
    }

    // The barrier gates the work phase on the whole roster arriving; once
    // everyone has worked, everyone disperses home and goes idle.
    wait_for(
        || {
            railway
                .workers
                .iter()
                .all(|w| !w.busy.load(std::sync::atomic::Ordering::Acquire))
        },
        "the whole roster to finish the job and come home",
    )
    .await;

    for (worker, home) in railway.workers.iter().zip([0u32, 1, 2]) {
        assert_eq!(worker.whereabouts(), Whereabouts::AtStation(StationId(home)));
    }
    for train in &railway.trains {
        assert!(train.valid_tickets.lock().unwrap().is_empty());
    }
}

// ── Assembly validation ───────────────────────────────────────────────────────

#[tokio::test]
async fn assembly_rejects_bad_references() {
    // Route through a nonexistent junction.
    let mut s = ring_scenario(0);
    s.trains[0].route = vec![0, 7];
    assert!(Railway::assemble(&s, FaultProfile::none()).is_err());

    // Route hop with no connecting edge.
    let s = scenario(
        vec![junction(0), junction(1), junction(2)],
        vec![segment(0, 0, 1)],
        vec![],
        vec![train(0, 0, "gap", &[0, 2])],
    );
    assert!(Railway::assemble(&s, FaultProfile::none()).is_err());

    // Single-junction route.
    let mut s = ring_scenario(0);
    s.trains[0].route = vec![0];
    assert!(Railway::assemble(&s, FaultProfile::none()).is_err());

    // Team based on a platform that does not exist.
    let mut s = ring_scenario(0);
    s.teams.push(TeamSpec {
        id: 0,
        speed: 100,
        home_platform: 9,
    });
    assert!(Railway::assemble(&s, FaultProfile::none()).is_err());
}

#[tokio::test]
async fn trains_register_with_their_stations() {
    let (railway, _events) = Railway::assemble(&two_line_scenario(), FaultProfile::none()).unwrap();

    // Train 0 runs 0→1→2→0: it passes ALPHA (0,1) and XCHG (1,2).
    assert_eq!(railway.train(TrainId(0)).connects, vec![StationId(0), StationId(1)]);
    // Stations know their callers.
    assert_eq!(railway.network.station(StationId(0)).trains, vec![TrainId(0)]);
    assert_eq!(
        railway.network.station(StationId(1)).trains,
        vec![TrainId(0), TrainId(1)]
    );
}
