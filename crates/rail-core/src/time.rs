//! Simulation time model.
//!
//! # Design
//!
//! The simulation runs in compressed real time: one simulated hour passes in
//! `seconds_per_hour` wall seconds.  There is no tick counter — simulated
//! time-of-day is a pure function of the wall clock:
//!
//! ```text
//! sim_hours = elapsed_wall_secs / seconds_per_hour
//! ```
//!
//! fanned out into an `HH:MM:SS` display anchored at a configurable starting
//! hour and minute.  `seconds_per_hour == 0` is accepted and means "run
//! uncompressed": every scaled sleep has zero length and the displayed clock
//! stays at the base time.  Tests use this to drive the protocol at full
//! speed.
//!
//! The minute carry is applied after the hour has been reduced modulo 24, so
//! a carry at the end of a day displays as hour 24 rather than 0.  Downstream
//! consumers only ever treat the string as an opaque timestamp.

use std::fmt;
use std::time::{Duration, Instant};

use crate::SimParams;

// ── ClockTime ─────────────────────────────────────────────────────────────────

/// A simulated time of day, produced by [`SimClock`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts wall time to simulated time-of-day.
///
/// Cheap to copy around behind an `Arc`; holds no mutable state.  The start
/// instant is captured when the clock is created, which the orchestrator does
/// immediately before spawning the first task.
#[derive(Clone, Debug)]
pub struct SimClock {
    start: Instant,
    seconds_per_hour: u32,
    base_hour: u32,
    base_minute: u32,
}

impl SimClock {
    /// Create a clock anchored at "now" with the scale and base time of
    /// `params`.
    pub fn new(params: &SimParams) -> Self {
        Self {
            start: Instant::now(),
            seconds_per_hour: params.seconds_per_hour,
            base_hour: params.clock_hour,
            base_minute: params.clock_minute,
        }
    }

    /// The simulated time-of-day right now.
    pub fn now(&self) -> ClockTime {
        self.at(self.start.elapsed())
    }

    /// The simulated time-of-day after `elapsed` wall time.
    ///
    /// Pure function of the argument; `now()` is `at(start.elapsed())`.
    pub fn at(&self, elapsed: Duration) -> ClockTime {
        if self.seconds_per_hour == 0 {
            return ClockTime {
                hour: self.base_hour,
                minute: self.base_minute,
                second: 0,
            };
        }

        let sim_hours = elapsed.as_secs_f64() / f64::from(self.seconds_per_hour);
        let whole_hours = sim_hours.trunc();
        let sim_minutes = 60.0 * sim_hours.fract();
        let whole_minutes = sim_minutes.trunc();
        let seconds = (60.0 * sim_minutes.fract()) as u32;

        let mut hour = (whole_hours as u32 + self.base_hour) % 24;
        let mut minute = whole_minutes as u32 + self.base_minute;
        if minute > 59 {
            hour += 1;
        }
        minute %= 60;

        ClockTime {
            hour,
            minute,
            second: seconds,
        }
    }

    /// Convert a duration in *simulated hours* to the wall-clock `Duration`
    /// an agent should actually sleep.
    pub fn wall_duration(&self, sim_hours: f64) -> Duration {
        Duration::from_secs_f64(f64::from(self.seconds_per_hour) * sim_hours.max(0.0))
    }
}
