// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stage selection controller.
//!
//! Sits between user input and the engine: every request passes the single
//! [`TransitionGuard`], tab feedback goes through a [`FeedbackPort`] keyed by
//! injected handles, and overview overlays are hidden or revealed in step
//! with the camera. Time-based follow-ups (guard release, deferred reset,
//! overlay reveal) fire from [`StageNavigator::tick`].

use crate::engine::CameraTransitionEngine;
use crate::guard::TransitionGuard;
use crate::settings::DeviceClass;
use crate::stage::StageId;
use crate::tween::TweenScheduler;
use std::collections::BTreeMap;
use std::mem;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Visual feedback on the stage tabs.
pub trait FeedbackPort {
    /// Whatever identifies one tab to the host (an element id, an index).
    type Handle;

    /// Show the "moving" state on `handle`.
    fn mark_transitioning(&mut self, handle: &Self::Handle);

    /// Clear the "moving" state on `handle`.
    fn clear_transitioning(&mut self, handle: &Self::Handle);

    /// Make `handle` the selected tab.
    fn activate(&mut self, handle: &Self::Handle);
}

/// Result of a selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The transition started; the value is its estimated duration.
    Started(Duration),
    /// Refused by the guard.
    Throttled,
    /// Reset postponed until the current transition settles.
    Deferred,
    /// The engine could not start it (recovery already ran).
    Failed,
}

/// Things the host should react to, reported from [`StageNavigator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    /// Hide the overview overlays.
    OverlayHidden,
    /// Show the overview overlays.
    OverlayRevealed,
    /// The guard released; new selections are accepted again.
    GuardReleased,
    /// A deferred reset to overview was retried.
    ResetRetried(Selection),
}

/// Stage selection through one guard in front of one engine.
#[derive(Debug)]
pub struct StageNavigator<S, F: FeedbackPort> {
    engine: CameraTransitionEngine<S>,
    guard: TransitionGuard,
    feedback: F,
    handles: BTreeMap<StageId, F::Handle>,
    marked: Option<StageId>,
    overlays_visible: bool,
    reveal_at: Option<Instant>,
    reset_at: Option<Instant>,
    outbox: Vec<NavigatorEvent>,
}

impl<S: TweenScheduler, F: FeedbackPort> StageNavigator<S, F> {
    /// Wrap `engine`; the guard interval comes from its settings.
    pub fn new(
        engine: CameraTransitionEngine<S>,
        feedback: F,
        handles: BTreeMap<StageId, F::Handle>,
    ) -> Self {
        let guard = TransitionGuard::new(engine.settings().guard.min_interval);
        Self {
            engine,
            guard,
            feedback,
            handles,
            marked: None,
            overlays_visible: true,
            reveal_at: None,
            reset_at: None,
            outbox: Vec::new(),
        }
    }

    /// Request a move to `stage`.
    pub fn select_stage(&mut self, stage: &str, now: Instant) -> Selection {
        if !self.guard.can_start(now, &self.engine) {
            debug!(stage, "selection throttled");
            return Selection::Throttled;
        }
        self.guard.mark_start(now);

        let estimate = self.engine.estimate(stage);
        let leaving_stage = !self.engine.current_stage().is_overview();
        self.mark_feedback(stage);

        let started = self.engine.animate_to(stage, None, now);
        // Overlays follow the camera; a fallback still heads for `stage`.
        if started || self.engine.is_transitioning() {
            self.cue_overlays(stage, leaving_stage, estimate, now);
        }
        if !started {
            self.guard.release_now();
            self.clear_feedback();
            return Selection::Failed;
        }

        let settle = self.engine.settings().guard.settle_margin;
        self.guard.mark_end_after(estimate + settle, now, None);
        info!(stage, estimate_ms = crate::engine::millis(estimate), "stage selected");
        Selection::Started(estimate)
    }

    /// Return to the overview, deferring while a transition is in flight.
    pub fn reset_to_overview(&mut self, now: Instant) -> Selection {
        if !self.guard.can_start(now, &self.engine) {
            let retry = self.engine.settings().guard.reset_retry;
            self.reset_at = Some(now + retry);
            debug!(retry_ms = crate::engine::millis(retry), "reset deferred");
            return Selection::Deferred;
        }
        self.reset_at = None;
        self.select_stage(StageId::OVERVIEW, now)
    }

    /// Drive the engine and fire due follow-ups.
    pub fn tick(&mut self, now: Instant) -> Vec<NavigatorEvent> {
        self.engine.tick(now);

        if self.guard.poll(now) {
            self.clear_feedback();
            self.outbox.push(NavigatorEvent::GuardReleased);
        }

        if self.reveal_at.is_some_and(|at| now >= at) {
            self.reveal_at = None;
            if self.engine.current_stage().is_overview() {
                self.show_overlays();
            }
        }

        if self.reset_at.is_some_and(|at| now >= at) {
            self.reset_at = None;
            let outcome = self.reset_to_overview(now);
            self.outbox.push(NavigatorEvent::ResetRetried(outcome));
        }

        mem::take(&mut self.outbox)
    }

    /// Forward a viewport change to the engine.
    pub fn handle_resize(&mut self, width: u32, height: u32, device: DeviceClass, now: Instant) {
        self.engine.handle_resize(width, height, device, now);
    }

    /// Hide overlays when entering a stage; reveal them on the way back to
    /// the overview, late when coming from a stage so they land with the
    /// camera.
    fn cue_overlays(&mut self, stage: &str, leaving_stage: bool, estimate: Duration, now: Instant) {
        if stage != StageId::OVERVIEW {
            self.reveal_at = None;
            if mem::replace(&mut self.overlays_visible, false) {
                self.outbox.push(NavigatorEvent::OverlayHidden);
            }
            return;
        }
        if leaving_stage {
            let fraction = self.engine.settings().guard.overlay_reveal_fraction;
            self.reveal_at = Some(now + estimate.mul_f32(fraction));
        } else {
            self.show_overlays();
        }
    }

    fn show_overlays(&mut self) {
        if !mem::replace(&mut self.overlays_visible, true) {
            self.outbox.push(NavigatorEvent::OverlayRevealed);
        }
    }

    fn mark_feedback(&mut self, stage: &str) {
        self.clear_feedback();
        if let Some((id, handle)) = self.handles.get_key_value(stage) {
            self.feedback.activate(handle);
            self.feedback.mark_transitioning(handle);
            self.marked = Some(id.clone());
        }
    }

    fn clear_feedback(&mut self) {
        if let Some(handle) = self.marked.take().and_then(|id| self.handles.get(&id)) {
            self.feedback.clear_transitioning(handle);
        }
    }
}

impl<S, F: FeedbackPort> StageNavigator<S, F> {
    /// The engine.
    pub const fn engine(&self) -> &CameraTransitionEngine<S> {
        &self.engine
    }

    /// Mutable engine, for hosts that attach a rig or prune notices.
    pub fn engine_mut(&mut self) -> &mut CameraTransitionEngine<S> {
        &mut self.engine
    }

    /// The shared guard.
    pub const fn guard(&self) -> &TransitionGuard {
        &self.guard
    }

    /// The feedback port.
    pub const fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Whether a deferred reset is waiting for its retry.
    pub const fn reset_pending(&self) -> bool {
        self.reset_at.is_some()
    }

    /// Whether the overview overlays are currently shown.
    pub const fn overlays_visible(&self) -> bool {
        self.overlays_visible
    }
}
