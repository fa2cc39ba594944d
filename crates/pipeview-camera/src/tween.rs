// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tween scheduling capability and the default frame-driven timeline.
//!
//! A tween animates one track of the [`CameraRig`] over time. Every tween is
//! tagged with the [`TransitionToken`] of its transition so cancellation can
//! be exact: cancelling one token never touches anyone else's tweens.
//!
//! Completion is reported through a oneshot channel per tween. A cancelled
//! tween drops its sender, so its receiver observes `Closed` and can never
//! signal a later transition.

use crate::easing::Easing;
use crate::rig::CameraRig;
use crate::transition::TransitionToken;
use glam::Vec3;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

/// What a tween writes each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    /// Ease the rig position from `from` to `to`.
    Position {
        /// Start position.
        from: Vec3,
        /// End position.
        to: Vec3,
    },
    /// Ease the look target from `from` to `to`.
    LookTarget {
        /// Start look target.
        from: Vec3,
        /// End look target.
        to: Vec3,
    },
    /// Keep re-aiming at a fixed point while the position moves.
    HoldGaze {
        /// Point to keep looking at.
        point: Vec3,
    },
}

impl Track {
    fn is_finite(&self) -> bool {
        match *self {
            Self::Position { from, to } | Self::LookTarget { from, to } => {
                from.is_finite() && to.is_finite()
            }
            Self::HoldGaze { point } => point.is_finite(),
        }
    }

    fn apply(&self, rig: &mut CameraRig, progress: f32, eased: f32) {
        let lerp = |from: Vec3, to: Vec3| if progress >= 1.0 { to } else { from.lerp(to, eased) };
        match *self {
            Self::Position { from, to } => rig.position = lerp(from, to),
            Self::LookTarget { from, to } => rig.aim(lerp(from, to)),
            Self::HoldGaze { point } => rig.aim(point),
        }
    }
}

/// One scheduled interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Owning transition.
    pub token: TransitionToken,
    /// Target track.
    pub track: Track,
    /// Length of the tween.
    pub duration: Duration,
    /// Easing curve.
    pub easing: Easing,
}

/// Failures a scheduler can report when asked to run a tween.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TweenError {
    /// The tween's endpoints contain NaN or infinity.
    #[error("tween for {0} has non-finite endpoints")]
    NonFinite(TransitionToken),
    /// The scheduler holds too many tweens.
    #[error("scheduler at capacity ({0} tweens)")]
    Capacity(usize),
    /// The scheduler cannot run tweens at all right now.
    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
}

/// Receiver resolved when a tween runs to completion.
pub type Completion = oneshot::Receiver<()>;

/// Injected animation capability used by the engine.
///
/// Implementations own the running tweens and write them into the rig when
/// advanced. Single-threaded and cooperative: nothing happens between calls.
pub trait TweenScheduler {
    /// Start `tween` with progress measured from `start`.
    fn schedule(&mut self, tween: Tween, start: Instant) -> Result<Completion, TweenError>;

    /// Drop every tween tagged with `token`; returns how many were dropped.
    fn cancel(&mut self, token: TransitionToken) -> usize;

    /// Write all running tweens into `rig` at `now`, resolving finished ones.
    fn advance(&mut self, now: Instant, rig: &mut CameraRig);

    /// Number of running tweens tagged with `token`.
    fn pending(&self, token: TransitionToken) -> usize;
}

struct Task {
    tween: Tween,
    start: Instant,
    done: Option<oneshot::Sender<()>>,
}

impl Task {
    fn progress(&self, now: Instant) -> Option<f32> {
        let elapsed = now.checked_duration_since(self.start)?;
        if self.tween.duration.is_zero() {
            return Some(1.0);
        }
        Some((elapsed.as_secs_f32() / self.tween.duration.as_secs_f32()).min(1.0))
    }
}

/// Default scheduler: a flat list of tasks sampled once per frame.
pub struct TweenTimeline {
    tasks: Vec<Task>,
    capacity: usize,
}

impl Default for TweenTimeline {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl std::fmt::Debug for TweenTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenTimeline")
            .field("running", &self.tasks.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl TweenTimeline {
    /// Timeline refusing new tweens beyond `capacity` running ones.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Vec::new(),
            capacity,
        }
    }

    /// Total running tweens across all tokens.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TweenScheduler for TweenTimeline {
    fn schedule(&mut self, tween: Tween, start: Instant) -> Result<Completion, TweenError> {
        if !tween.track.is_finite() {
            return Err(TweenError::NonFinite(tween.token));
        }
        if self.tasks.len() >= self.capacity {
            return Err(TweenError::Capacity(self.capacity));
        }
        let (tx, rx) = oneshot::channel();
        self.tasks.push(Task {
            tween,
            start,
            done: Some(tx),
        });
        Ok(rx)
    }

    fn cancel(&mut self, token: TransitionToken) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.tween.token != token);
        before - self.tasks.len()
    }

    fn advance(&mut self, now: Instant, rig: &mut CameraRig) {
        for task in &mut self.tasks {
            let Some(progress) = task.progress(now) else {
                continue;
            };
            let tween = &task.tween;
            tween.track.apply(rig, progress, tween.easing.apply(progress));
            if progress >= 1.0 {
                if let Some(done) = task.done.take() {
                    // The receiver may already be gone (transition replaced).
                    let _ = done.send(());
                }
                trace!(token = %tween.token, track = ?tween.track, "tween finished");
            }
        }
        self.tasks.retain(|t| t.done.is_some());
    }

    fn pending(&self, token: TransitionToken) -> usize {
        self.tasks.iter().filter(|t| t.tween.token == token).count()
    }
}
