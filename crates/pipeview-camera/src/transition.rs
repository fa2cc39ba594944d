// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transition identity and the state snapshot handed to UI code.

use crate::stage::StageId;
use std::fmt;
use std::time::Instant;

/// Opaque identifier of one transition attempt.
///
/// Tokens are never reused within an engine; every tween is tagged with the
/// token of the transition that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// Token with an explicit value (useful for schedulers and tests).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t#{}", self.0)
    }
}

/// Monotonic token source.
#[derive(Debug, Default)]
pub(crate) struct TokenSource {
    last: u64,
}

impl TokenSource {
    pub(crate) fn next(&mut self) -> TransitionToken {
        self.last += 1;
        TransitionToken(self.last)
    }
}

/// Phase of the engine's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionPhase {
    /// Idle.
    #[default]
    None,
    /// Single-phase transition in flight.
    Direct,
    /// Arc pull-back in flight.
    ArcStep1,
    /// Arc approach in flight.
    ArcStep2,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Direct => "direct",
            Self::ArcStep1 => "arc-step1",
            Self::ArcStep2 => "arc-step2",
        })
    }
}

/// Snapshot of the engine's transition state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInfo {
    /// Whether a transition is in flight.
    pub active: bool,
    /// Token of the in-flight transition.
    pub token: Option<TransitionToken>,
    /// Current phase ([`TransitionPhase::None`] when idle).
    pub phase: TransitionPhase,
    /// When the in-flight transition started.
    pub started_at: Option<Instant>,
    /// Stage the in-flight transition is heading to.
    pub target: Option<StageId>,
}

impl TransitionInfo {
    /// The idle snapshot.
    pub fn idle() -> Self {
        Self {
            active: false,
            token: None,
            phase: TransitionPhase::None,
            started_at: None,
            target: None,
        }
    }
}

/// Read-only view of whether a camera is mid-transition.
///
/// The guard composes with this instead of reaching for a global engine.
pub trait TransitionStatus {
    /// Whether any transition is in flight.
    fn is_transitioning(&self) -> bool;
}
