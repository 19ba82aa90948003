//! Unit tests for the network model and corridor search.

use std::time::Duration;

use rail_core::{JunctionId, JunctionSpec, Lane, PlatformSpec, SegmentSpec, StationId, TrackId, TrainId, WorkerId};

use crate::network::{build_network, Network};
use crate::path::search_corridor;
use crate::station::Ticket;
use crate::track::TrackKind;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn junction_spec(id: u32) -> JunctionSpec {
    JunctionSpec {
        id,
        rotate_min: 6,
        repair_min: 60,
    }
}

fn segment_spec(id: u32, first: u32, second: u32) -> SegmentSpec {
    SegmentSpec {
        id,
        length_km: 100,
        speed_limit: 100,
        repair_min: 60,
        first,
        second,
    }
}

fn platform_spec(id: u32, name: &str, first: u32, second: u32) -> PlatformSpec {
    PlatformSpec {
        id,
        name: name.into(),
        dwell_min: 6,
        repair_min: 60,
        first,
        second,
    }
}

/// Line network: J0 —s01— J1 —s12— J2, with platform ALPHA between 0 and 1.
///
/// Track ids: 0..=2 junctions, 3 = s01, 4 = s12, 5 = platform.
fn line_network() -> Network {
    build_network(
        &[junction_spec(0), junction_spec(1), junction_spec(2)],
        &[segment_spec(0, 0, 1), segment_spec(1, 1, 2)],
        &[platform_spec(0, "alpha", 0, 1)],
    )
    .unwrap()
}

// ── Builder ───────────────────────────────────────────────────────────────────

mod builder {
    use super::*;

    #[test]
    fn junction_turntables_come_first() {
        let net = line_network();
        assert_eq!(net.tracks.len(), 6);
        for j in 0..3 {
            assert!(net.tracks[j].is_junction());
            assert_eq!(net.junctions[j], TrackId(j as u32));
        }
    }

    #[test]
    fn platforms_sharing_endpoints_share_a_station() {
        let net = build_network(
            &[junction_spec(0), junction_spec(1), junction_spec(2)],
            &[],
            &[
                platform_spec(0, "alpha", 0, 1),
                platform_spec(1, "alpha", 0, 1),
                platform_spec(2, "beta", 1, 2),
            ],
        )
        .unwrap();

        assert_eq!(net.stations.len(), 2);
        assert_eq!(net.stations[0].platforms.len(), 2);
        assert_eq!(net.stations[0].name, "ALPHA");
        assert_eq!(net.stations[1].platforms.len(), 1);
        assert_eq!(net.track(net.stations[0].platforms[1]).station(), Some(StationId(0)));
    }

    #[test]
    fn self_looped_platform_registered_once() {
        let net = build_network(
            &[junction_spec(0)],
            &[],
            &[platform_spec(0, "loop", 0, 0)],
        )
        .unwrap();

        let platform = net.stations[0].platforms[0];
        assert_eq!(net.topology.between(JunctionId(0), JunctionId(0)), [platform]);
        // Incident exactly once from the junction's point of view too.
        let incident: Vec<_> = net.topology.adjacent_to(JunctionId(0)).collect();
        assert_eq!(incident, vec![platform]);
    }

    #[test]
    fn out_of_range_endpoint_rejected() {
        let err = build_network(&[junction_spec(0)], &[segment_spec(0, 0, 3)], &[]);
        assert!(err.is_err());
    }

    #[test]
    fn platform_names_uppercased() {
        let net = line_network();
        match &net.tracks[5].kind {
            TrackKind::Platform { name, .. } => assert_eq!(name, "ALPHA"),
            other => panic!("expected platform, got {other:?}"),
        }
    }
}

// ── Adjacency ─────────────────────────────────────────────────────────────────

mod adjacency {
    use super::*;

    #[test]
    fn edge_neighbors_are_its_turntables() {
        let net = line_network();
        assert_eq!(net.neighbors(TrackId(3)), vec![TrackId(0), TrackId(1)]);
        assert_eq!(net.neighbors(TrackId(5)), vec![TrackId(0), TrackId(1)]);
    }

    #[test]
    fn junction_neighbors_are_incident_edges() {
        let net = line_network();
        let mut n = net.neighbors(TrackId(1));
        n.sort();
        // s01, s12, and the ALPHA platform all touch junction 1.
        assert_eq!(n, vec![TrackId(3), TrackId(4), TrackId(5)]);
    }

    #[test]
    fn siblings_share_both_endpoints() {
        let net = line_network();
        // s01 and the platform both sit between junctions 0 and 1.
        assert_eq!(net.siblings(TrackId(3)), [TrackId(3), TrackId(5)]);
        assert_eq!(net.siblings(TrackId(4)), [TrackId(4)]);
        assert!(net.siblings(TrackId(0)).is_empty());
    }

    #[test]
    fn action_hours_per_kind() {
        let net = line_network();
        // Segment: 100 km at min(limit 100, speed 200) = 1 h; at speed 50 = 2 h.
        assert_eq!(net.track(TrackId(3)).action_hours(200), 1.0);
        assert_eq!(net.track(TrackId(3)).action_hours(50), 2.0);
        // Platform dwell 6 min, junction rotate 6 min.
        assert_eq!(net.track(TrackId(5)).action_hours(100), 0.1);
        assert_eq!(net.track(TrackId(0)).action_hours(100), 0.1);
    }
}

// ── Reservation endpoints ─────────────────────────────────────────────────────

mod reservation {
    use super::*;

    #[tokio::test]
    async fn reserve_requires_parked_server() {
        let net = line_network();
        assert!(!net.track(TrackId(3)).reserve());
    }

    #[tokio::test]
    async fn reserve_then_cancel_roundtrip() {
        let net = std::sync::Arc::new(line_network());

        // Stand-in for the free-state server: accept one reservation, then
        // park on the cancellation endpoint.
        let server_net = net.clone();
        let server = tokio::spawn(async move {
            let track = server_net.track(TrackId(3));
            track.chan.reserved.recv().await.unwrap();
            track.chan.cancelled.recv().await.unwrap();
        });
        tokio::task::yield_now().await;

        let track = net.track(TrackId(3));
        assert!(track.reserve());
        assert!(track.take_available(), "reserve arms the hint");
        assert!(!track.take_available(), "hint is single-shot");

        track.cancel().await.unwrap();
        server.await.unwrap();
    }
}

// ── Corridor search ───────────────────────────────────────────────────────────

mod corridor {
    use super::*;

    #[tokio::test]
    async fn finds_path_through_reserved_tracks() {
        let net = std::sync::Arc::new(line_network());

        // Fault on s12: destinations are its endpoint turntables.  The
        // blanket reservation armed everything except the client and the
        // home platform (occupied by the searcher itself).
        let destinations = vec![TrackId(1), TrackId(2)];
        for id in [0u32, 1, 2, 3] {
            net.track(TrackId(id)).chan.available.arm();
        }

        let reply: Lane<Vec<TrackId>> = Lane::rendezvous();
        let rx = reply.clone();
        let answer = tokio::spawn(async move { rx.recv().await.unwrap() });
        tokio::task::yield_now().await;

        search_corridor(&net, TrackId(5), &destinations, &reply);

        let path = answer.await.unwrap();
        assert_eq!(path, vec![TrackId(5), TrackId(0), TrackId(3), TrackId(1)]);
    }

    #[tokio::test]
    async fn exhausted_region_posts_nothing() {
        let net = line_network();
        // No availability hints armed at all: the walk cannot leave home.
        let reply: Lane<Vec<TrackId>> = Lane::rendezvous();

        search_corridor(&net, TrackId(5), &[TrackId(2)], &reply);

        let got = tokio::time::timeout(Duration::from_millis(10), reply.recv()).await;
        assert!(got.is_err(), "no path should have been posted");
    }
}

// ── Stations ──────────────────────────────────────────────────────────────────

mod stations {
    use super::*;

    fn ticket(owner: u32, train: u32) -> Ticket {
        Ticket {
            owner: WorkerId(owner),
            departure: StationId(0),
            destination: StationId(1),
            train: TrainId(train),
        }
    }

    #[test]
    fn booking_is_fifo_per_train() {
        let net = line_network();
        let station = net.station(StationId(0));

        station.book(ticket(1, 0));
        station.book(ticket(2, 0));
        station.book(ticket(3, 1));

        assert_eq!(station.queued_for(TrainId(0)), 2);
        assert_eq!(station.next_ticket(TrainId(0)).unwrap().owner, WorkerId(1));
        assert_eq!(station.next_ticket(TrainId(0)).unwrap().owner, WorkerId(2));
        assert!(station.next_ticket(TrainId(0)).is_none());
        assert_eq!(station.next_ticket(TrainId(1)).unwrap().owner, WorkerId(3));
    }

    #[test]
    fn connects_is_orientation_blind() {
        let net = line_network();
        let station = net.station(StationId(0));
        assert!(station.connects(JunctionId(0), JunctionId(1)));
        assert!(station.connects(JunctionId(1), JunctionId(0)));
        assert!(!station.connects(JunctionId(1), JunctionId(2)));
    }
}
