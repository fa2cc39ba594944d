// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Throttling gate in front of the engine.
//!
//! A start is refused while the guard is busy, while the minimum interval
//! since the previous start has not elapsed, or while the engine reports a
//! transition in flight. Release is cooperative: [`TransitionGuard::poll`]
//! fires a due release from the render tick.

use crate::transition::TransitionStatus;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Callback run once the guard releases.
pub type OnEnd = Box<dyn FnOnce() + Send>;

struct PendingRelease {
    at: Instant,
    on_end: Option<OnEnd>,
}

/// Busy flag plus minimum start interval.
pub struct TransitionGuard {
    busy: bool,
    last_start: Option<Instant>,
    min_interval: Duration,
    pending: Option<PendingRelease>,
}

impl fmt::Debug for TransitionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionGuard")
            .field("busy", &self.busy)
            .field("last_start", &self.last_start)
            .field("min_interval", &self.min_interval)
            .field("release_at", &self.pending.as_ref().map(|p| p.at))
            .finish()
    }
}

impl TransitionGuard {
    /// Idle guard enforcing `min_interval` between starts.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            busy: false,
            last_start: None,
            min_interval,
            pending: None,
        }
    }

    /// Whether a new transition may start at `now`. Pure query.
    pub fn can_start(&self, now: Instant, status: &impl TransitionStatus) -> bool {
        if self.busy || status.is_transitioning() {
            return false;
        }
        self.last_start
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval)
    }

    /// Record a start; the guard stays busy until released.
    pub fn mark_start(&mut self, now: Instant) {
        self.busy = true;
        self.last_start = Some(now);
        self.pending = None;
    }

    /// Schedule the release `delay` after `now`, then run `on_end`.
    ///
    /// A later call replaces an earlier pending release.
    pub fn mark_end_after(&mut self, delay: Duration, now: Instant, on_end: Option<OnEnd>) {
        let at = now + delay;
        debug!(delay_ms = crate::engine::millis(delay), "guard release scheduled");
        self.pending = Some(PendingRelease { at, on_end });
    }

    /// [`mark_end_after`](Self::mark_end_after) with a signed millisecond
    /// delay; negative values release on the next poll.
    pub fn mark_end_after_ms(&mut self, delay_ms: i64, now: Instant, on_end: Option<OnEnd>) {
        let delay = Duration::from_millis(u64::try_from(delay_ms).unwrap_or(0));
        self.mark_end_after(delay, now, on_end);
    }

    /// Release immediately, dropping any scheduled release without running
    /// its callback.
    pub fn release_now(&mut self) {
        self.busy = false;
        self.pending = None;
    }

    /// Fire a due release. Returns true if one fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.at);
        if !due {
            return false;
        }
        self.busy = false;
        if let Some(on_end) = self.pending.take().and_then(|p| p.on_end) {
            on_end();
        }
        debug!("guard released");
        true
    }

    /// Whether a start is being held.
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// When the pending release is due, if one is scheduled.
    pub fn release_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.at)
    }

    /// Configured minimum interval.
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
