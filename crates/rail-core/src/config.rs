//! Simulation parameters and the parsed scenario description.
//!
//! The structures here are plain data: the loader in `rail-io` fills them
//! from the input file and the builder in `rail-sim` turns them into a live
//! railway.  All cross-references are *positional indexes* into the spec
//! lists (a segment's `first` names the first-th junction line of the file),
//! matching the input format; the builder validates every index before any
//! task is spawned.

use crate::{CoreError, CoreResult};

// ── SimParams ─────────────────────────────────────────────────────────────────

/// Top-level timing and determinism knobs.
#[derive(Clone, Debug)]
pub struct SimParams {
    /// How many wall seconds one simulated hour lasts.  `0` means
    /// uncompressed (all scaled sleeps are zero-length).
    pub seconds_per_hour: u32,

    /// Simulated clock base: starting hour (0–23).
    pub clock_hour: u32,

    /// Simulated clock base: starting minute (0–59).
    pub clock_minute: u32,

    /// Master RNG seed.  Per-task RNGs are derived from it; with a fixed
    /// task interleaving the same seed reproduces the same faults.
    pub seed: u64,
}

impl SimParams {
    /// Reject out-of-range clock bases before anything is built on them.
    pub fn validate(&self) -> CoreResult<()> {
        if self.clock_hour > 23 {
            return Err(CoreError::Config(format!(
                "starting hour {} out of range 0..=23",
                self.clock_hour
            )));
        }
        if self.clock_minute > 59 {
            return Err(CoreError::Config(format!(
                "starting minute {} out of range 0..=59",
                self.clock_minute
            )));
        }
        Ok(())
    }
}

// ── Resource and agent specs ──────────────────────────────────────────────────

/// One junction line: `id rotate-min repair-min`.
#[derive(Clone, Debug)]
pub struct JunctionSpec {
    pub id: u32,
    pub rotate_min: u32,
    pub repair_min: u32,
}

/// One segment line: `id length-km speed-kmh repair-min junctionA junctionB`.
#[derive(Clone, Debug)]
pub struct SegmentSpec {
    pub id: u32,
    pub length_km: u32,
    pub speed_limit: u32,
    pub repair_min: u32,
    pub first: u32,
    pub second: u32,
}

/// One platform line: `id name dwell-min repair-min junctionA junctionB`.
///
/// The endpoints may coincide (a stub platform hanging off one junction).
#[derive(Clone, Debug)]
pub struct PlatformSpec {
    pub id: u32,
    pub name: String,
    pub dwell_min: u32,
    pub repair_min: u32,
    pub first: u32,
    pub second: u32,
}

/// One repair-team line: `id speed home-platform-id`.
#[derive(Clone, Debug)]
pub struct TeamSpec {
    pub id: u32,
    pub speed: u32,
    pub home_platform: u32,
}

/// One train block: `id speed capacity repair-min name route-length` plus a
/// line of `route-length` junction indexes.
#[derive(Clone, Debug)]
pub struct TrainSpec {
    pub id: u32,
    pub speed: u32,
    pub capacity: u32,
    pub repair_min: u32,
    pub name: String,
    pub route: Vec<u32>,
}

/// One worker line: `id home-platform-id`.
#[derive(Clone, Debug)]
pub struct WorkerSpec {
    pub id: u32,
    pub home_platform: u32,
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Everything the input file describes, in parse order.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub params: SimParams,
    pub junctions: Vec<JunctionSpec>,
    pub segments: Vec<SegmentSpec>,
    pub platforms: Vec<PlatformSpec>,
    pub teams: Vec<TeamSpec>,
    pub trains: Vec<TrainSpec>,
    pub workers: Vec<WorkerSpec>,
}
