//! Simulation time model.
//!
//! Time is represented as a millisecond `Tick` counter, matching the
//! reference model's convention of integer-millisecond timestamps throughout
//! the scheduler.  Using an integer tick as the canonical time unit means all
//! schedule arithmetic (cycle-time firing, window bounds) is exact — no
//! floating point drift, and comparisons are O(1).

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation timestamp, in milliseconds since the run's start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub i64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` milliseconds after `self`.
    #[inline]
    pub fn offset(self, n: i64) -> Tick {
        Tick(self.0 + n)
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> i64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<i64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: i64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Tick) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms", self.0)
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration for a single scheduler invocation.
///
/// Mirrors the fields the slave command line and blueprint configuration
/// expose: start and end time bound the run, `framework_update_rate_ms`
/// bounds the scheduler's pre-computed timestamp window, and `seed` drives
/// every deterministic RNG derived from it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Simulation start time, in ms. Usually 0.
    pub start_time_ms: i64,

    /// Simulation end time, in ms (inclusive upper bound on the tick loop).
    pub end_time_ms: i64,

    /// Width of the scheduler's pre-computed timestamp window, in ms.
    /// Default: 100 (the reference model's `frameworkUpdateRate`).
    pub framework_update_rate_ms: i64,

    /// Master RNG seed. The same seed always produces identical results.
    pub seed: u64,
}

impl RunConfig {
    /// Construct a config with the reference model's default update rate (100 ms).
    pub fn new(start_time_ms: i64, end_time_ms: i64, seed: u64) -> Self {
        Self {
            start_time_ms,
            end_time_ms,
            framework_update_rate_ms: 100,
            seed,
        }
    }

    #[inline]
    pub fn start_tick(&self) -> Tick {
        Tick(self.start_time_ms)
    }

    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.end_time_ms)
    }
}
