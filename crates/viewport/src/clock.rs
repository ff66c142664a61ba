//! Frame clocks: monotonic elapsed time since the loop started.

use serde::Serialize;
use std::cell::Cell;
use std::time::Instant;

/// Source of elapsed time for the loop.
pub trait FrameClock {
    /// Seconds since the clock started. Must not decrease between calls.
    fn elapsed(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    start: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for InstantClock {
    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// The first read returns 0.0. Used by the headless harness and tests.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    step: f64,
    reads: Cell<u64>,
}

impl SteppedClock {
    pub fn new(step: f64) -> Self {
        Self {
            step,
            reads: Cell::new(0),
        }
    }

    /// A clock stepping at 60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }

    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl FrameClock for SteppedClock {
    fn elapsed(&self) -> f64 {
        let n = self.reads.get();
        self.reads.set(n + 1);
        n as f64 * self.step
    }
}

/// Timing snapshot handed to per-frame update hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameTime {
    /// Seconds since the loop started.
    pub elapsed: f64,
    /// Seconds since the previous tick; 0 on the first tick.
    pub delta: f64,
    /// Index of the frame being produced, starting at 0.
    pub frame: u64,
}
