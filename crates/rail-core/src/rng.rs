//! Task-local randomness.
//!
//! Fault rolls and job dispatch happen on many independent tasks, so there
//! is one [`SimRng`] per task rather than a shared generator: no lock, and
//! no cross-task ordering dependency in what each task draws.  A task's
//! generator is identified by a *stream* number carved out by the caller
//! (tracks, trains, and the dispatcher each get their own range), and the
//! run's master seed plus the stream fully determine that task's draws.
//!
//! Stream separation uses a 64-bit avalanche mix (the Murmur3 finalizer)
//! over seed and stream, so adjacent stream numbers land on unrelated
//! `SmallRng` states.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Collapse `(seed, stream)` into one well-spread 64-bit state.
fn avalanche(seed: u64, stream: u64) -> u64 {
    let mut x = seed ^ stream.rotate_left(32);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// A deterministic random stream owned by a single task.
pub struct SimRng(SmallRng);

impl SimRng {
    /// Open stream `stream` of the run seeded by `seed`.
    pub fn stream(seed: u64, stream: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(avalanche(seed, stream)))
    }

    /// One Bernoulli trial: `true` with probability `p`.
    ///
    /// Probabilities at or beyond the ends short-circuit, so a zeroed fault
    /// profile draws nothing from the stream.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.0.gen_bool(p)
        }
    }

    /// A uniform draw from `range`.
    #[inline]
    pub fn roll<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Draw `n` elements of `pool` without replacement (all of them if the
    /// pool is smaller), in draw order.
    ///
    /// Partial Fisher–Yates: only the drawn prefix is shuffled.
    pub fn sample<T>(&mut self, mut pool: Vec<T>, n: usize) -> Vec<T> {
        let n = n.min(pool.len());
        for i in 0..n {
            let j = self.0.gen_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(n);
        pool
    }
}
