// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Camera transition engine for the Pipeview pipeline demo.

This crate provides:
- A registry of named viewpoints, one per pipeline stage plus an overview
  (`ViewpointRegistry`).
- The transition state machine (`CameraTransitionEngine`) that moves a
  `CameraRig` along a direct or two-step arc path through an injected
  `TweenScheduler`.
- A throttling gate (`TransitionGuard`), a duration predictor
  (`DurationEstimator`), and the stage selection controller that ties them
  together (`StageNavigator`).

Design notes:
- Cooperative and single-threaded: every call takes an explicit `Instant`
  and nothing moves between ticks.
- Every tween carries the token of the transition that scheduled it;
  interruption cancels by token and superseded completions are dropped.
- Failures never reach the caller; the engine falls back to a short direct
  move or raises a user notice.
"]

mod easing;
mod engine;
mod error;
mod estimator;
mod guard;
mod navigator;
mod recovery;
mod rig;
mod settings;
mod stage;
mod topology;
mod transition;
mod tween;
mod viewpoint;
mod waypoint;

pub use easing::Easing;
pub use engine::{CameraTransitionEngine, HOLD_GAZE_DISTANCE};
pub use error::{CameraError, REFRESH_MESSAGE, RETRY_MESSAGE};
pub use estimator::DurationEstimator;
pub use guard::{OnEnd, TransitionGuard};
pub use navigator::{FeedbackPort, NavigatorEvent, Selection, StageNavigator};
pub use recovery::RecoveryOutcome;
pub use rig::CameraRig;
pub use settings::{
    ArcConfig, ArcDetection, CameraSettings, DeviceAdaptConfig, DeviceClass, DirectConfig,
    GuardConfig, LensConfig, PerDevice, RecoveryConfig,
};
pub use stage::StageId;
pub use topology::{decide, Topology, TopologyFlags};
pub use transition::{TransitionInfo, TransitionPhase, TransitionStatus, TransitionToken};
pub use tween::{Completion, Track, Tween, TweenError, TweenScheduler, TweenTimeline};
pub use viewpoint::{Viewpoint, ViewpointRegistry};
pub use waypoint::arc_waypoint;
