// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Manual frame clock.
//!
//! Tick-driven code in Pipeview takes `now: Instant` explicitly; tests use
//! this clock to step time in fixed frames instead of sleeping.

use std::time::{Duration, Instant};

/// Roughly one 60 Hz frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Deterministic clock advanced by hand.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
    now: Instant,
    step: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME)
    }
}

impl FrameClock {
    /// Clock starting at the current instant, stepping by `step`.
    pub fn new(step: Duration) -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: origin,
            step,
        }
    }

    /// Current instant.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Frame length.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now - self.origin
    }

    /// Advance by one frame and return the new instant.
    pub fn tick(&mut self) -> Instant {
        self.now += self.step;
        self.now
    }

    /// Advance by an arbitrary amount and return the new instant.
    pub fn advance(&mut self, by: Duration) -> Instant {
        self.now += by;
        self.now
    }
}
