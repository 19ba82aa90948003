//! The network registry and its validating builder.
//!
//! The registry owns every track and station; all cross-references are ids.
//! Junction turntables occupy the first `J` slots of the flat track array so
//! `junctions[j]` is a trivial lookup.

use rail_core::{
    JunctionId, JunctionSpec, PlatformSpec, SegmentSpec, StationId, TrackId, TrainId,
};

use crate::error::{NetError, NetResult};
use crate::station::Station;
use crate::topology::Topology;
use crate::track::{Track, TrackKind};

// ── Network ───────────────────────────────────────────────────────────────────

/// Everything static about the railway: tracks, stations, adjacency.
#[derive(Debug)]
pub struct Network {
    /// All resources — junction turntables first, then segments, then
    /// platforms — indexed by `TrackId`.
    pub tracks: Vec<Track>,
    /// Stations, indexed by `StationId`.
    pub stations: Vec<Station>,
    /// Edge adjacency between junction pairs.
    pub topology: Topology,
    /// `JunctionId` → `TrackId` of its turntable.
    pub junctions: Vec<TrackId>,
}

impl Network {
    #[inline]
    pub fn track(&self, id: TrackId) -> &Track {
        &self.tracks[id.index()]
    }

    #[inline]
    pub fn junction_track(&self, j: JunctionId) -> &Track {
        self.track(self.junctions[j.index()])
    }

    #[inline]
    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    /// The tracks reachable in one hop from `from`.
    ///
    /// A junction's neighbors are every edge incident to it; an edge's
    /// neighbors are its two endpoint turntables (listed twice for a
    /// self-looped platform, which downstream availability gating collapses
    /// to one visit).
    pub fn neighbors(&self, from: TrackId) -> Vec<TrackId> {
        let track = self.track(from);
        match track.kind {
            TrackKind::Junction { junction, .. } => self.topology.adjacent_to(junction).collect(),
            _ => vec![
                self.junctions[track.first.index()],
                self.junctions[track.second.index()],
            ],
        }
    }

    /// The edges sharing both endpoints with `track` (itself included).
    ///
    /// Empty for junctions, which have no parallel twins.
    pub fn siblings(&self, track: TrackId) -> &[TrackId] {
        let t = self.track(track);
        if t.is_junction() {
            return &[];
        }
        self.topology.between(t.first, t.second)
    }

    /// Register that `train` serves `station` (assembly time only).
    pub fn register_train(&mut self, station: StationId, train: TrainId) {
        let trains = &mut self.stations[station.index()].trains;
        if !trains.contains(&train) {
            trains.push(train);
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Build a [`Network`] from the scenario's resource specs.
///
/// Stations are derived, not declared: platforms sharing the same ordered
/// endpoint pair and name grouping rule — the first platform seen for a pair
/// founds the station and donates its name — are clustered together.
///
/// All junction references are validated here; a bad index aborts before any
/// channel exists.
pub fn build_network(
    junctions: &[JunctionSpec],
    segments: &[SegmentSpec],
    platforms: &[PlatformSpec],
) -> NetResult<Network> {
    let junction_count = junctions.len();
    let check = |what: &'static str, index: u32| -> NetResult<JunctionId> {
        if (index as usize) < junction_count {
            Ok(JunctionId(index))
        } else {
            Err(NetError::Reference {
                what,
                index: index as usize,
                len: junction_count,
            })
        }
    };

    let mut tracks: Vec<Track> = Vec::with_capacity(junction_count + segments.len() + platforms.len());
    let mut topology = Topology::new(junction_count);

    // ── Junction turntables occupy TrackIds 0..J ──────────────────────────
    let mut junction_tracks = Vec::with_capacity(junction_count);
    for (i, spec) in junctions.iter().enumerate() {
        let id = TrackId(i as u32);
        junction_tracks.push(id);
        tracks.push(Track::junction(
            id,
            JunctionId(i as u32),
            spec.rotate_min,
            spec.repair_min,
        ));
    }

    // ── Segments ──────────────────────────────────────────────────────────
    for spec in segments {
        let first = check("segment endpoint", spec.first)?;
        let second = check("segment endpoint", spec.second)?;
        let id = TrackId(tracks.len() as u32);
        topology.add_edge(first, second, id);
        tracks.push(Track::segment(
            id,
            spec.length_km,
            spec.speed_limit,
            spec.repair_min,
            first,
            second,
        ));
    }

    // ── Stations, then their platforms ────────────────────────────────────
    //
    // Grouping key is the *ordered* endpoint pair, matching the input
    // convention that co-located platforms are declared with the same
    // orientation.
    let mut stations: Vec<Station> = Vec::new();
    for spec in platforms {
        let first = check("platform endpoint", spec.first)?;
        let second = check("platform endpoint", spec.second)?;
        let id = TrackId(tracks.len() as u32);

        let station = match stations
            .iter_mut()
            .find(|s| s.first == first && s.second == second)
        {
            Some(existing) => {
                existing.platforms.push(id);
                existing.id
            }
            None => {
                let sid = StationId(stations.len() as u32);
                stations.push(Station::new(
                    sid,
                    spec.name.to_uppercase(),
                    first,
                    second,
                    id,
                ));
                sid
            }
        };

        topology.add_edge(first, second, id);
        tracks.push(Track::platform(
            id,
            spec.name.clone(),
            spec.dwell_min,
            spec.repair_min,
            first,
            second,
            station,
        ));
    }

    Ok(Network {
        tracks,
        stations,
        topology,
        junctions: junction_tracks,
    })
}
