// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! User-facing notices with TTL and dedupe.
//!
//! Engines push short, non-technical messages here (e.g. "please refresh");
//! the host UI drains or renders them each frame. Time is always passed in so
//! the board stays deterministic under test.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational.
    Info,
    /// Something degraded but the view still works.
    Warn,
    /// The requested action failed.
    Error,
}

/// Identifier handed back by [`NoticeBoard::push`].
pub type NoticeId = u64;

/// A queued notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Stable identifier (reused when a duplicate is refreshed).
    pub id: NoticeId,
    /// Severity.
    pub kind: NoticeKind,
    /// Message shown to the user.
    pub message: String,
    /// How long the notice stays visible.
    pub ttl: Duration,
    /// When the notice was (last) raised.
    pub raised: Instant,
}

impl Notice {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.raised)
    }

    fn is_live(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }
}

/// Bounded notice queue.
///
/// Identical messages raised within the dedupe window refresh the existing
/// entry instead of stacking.
#[derive(Debug)]
pub struct NoticeBoard {
    queue: VecDeque<Notice>,
    capacity: usize,
    dedupe_window: Duration,
    next_id: NoticeId,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(8)
    }
}

impl NoticeBoard {
    /// Board holding at most `capacity` notices (oldest evicted first).
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(1),
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Raise a notice, refreshing a matching one raised within the dedupe window.
    pub fn push(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        ttl: Duration,
        now: Instant,
    ) -> NoticeId {
        let message = message.into();
        let window = self.dedupe_window;
        if let Some(existing) = self
            .queue
            .iter_mut()
            .find(|n| n.kind == kind && n.message == message && n.age(now) <= window)
        {
            existing.raised = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() >= self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            id,
            kind,
            message,
            ttl,
            raised: now,
        });
        id
    }

    /// Drop expired notices; call once per frame.
    pub fn retain_live(&mut self, now: Instant) {
        self.queue.retain(|n| n.is_live(now));
    }

    /// Notices still visible at `now`, oldest first.
    pub fn live(&self, now: Instant) -> impl Iterator<Item = &Notice> + '_ {
        self.queue.iter().filter(move |n| n.is_live(now))
    }

    /// Most recently queued notice, expired or not.
    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    /// Number of queued notices.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
