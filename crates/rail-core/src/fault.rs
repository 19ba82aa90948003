//! Breakage probabilities.
//!
//! Each completed regular rendezvous ends with a Bernoulli trial on the
//! resource's side (and each junction hop with one on the train's side).
//! The profile is injected at assembly time so tests can run with all
//! probabilities zeroed.

/// Per-kind probabilities that a resource flags itself broken after serving
/// a regular rider.
#[derive(Copy, Clone, Debug)]
pub struct FaultProfile {
    pub segment: f64,
    pub platform: f64,
    pub junction: f64,
    pub train: f64,
}

impl Default for FaultProfile {
    fn default() -> Self {
        Self {
            segment: 0.05,
            platform: 0.01,
            junction: 0.08,
            train: 0.005,
        }
    }
}

impl FaultProfile {
    /// All-zero profile: nothing ever breaks.  Used by tests and by runs
    /// without the repair subsystem where breakage would only add noise.
    pub fn none() -> Self {
        Self {
            segment: 0.0,
            platform: 0.0,
            junction: 0.0,
            train: 0.0,
        }
    }
}
