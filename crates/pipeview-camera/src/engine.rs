// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Camera transition state machine.
//!
//! ```text
//! Idle ── animate_to ──> Direct ───────────────────────────> Idle
//! Idle ── animate_to ──> ArcStep1 ──(step 1 done)──> ArcStep2 ──> Idle
//! ```
//!
//! Any state returns to Idle on interruption or error. The engine never
//! writes the rig itself; it schedules tweens tagged with the active
//! transition's token and the scheduler writes them on [`tick`].
//!
//! Phase completion arrives on a oneshot receiver owned by the active
//! transition. Replacing or interrupting the transition drops that receiver
//! (and cancels the tweens holding the senders), so a superseded phase has
//! nowhere to deliver its completion.
//!
//! [`tick`]: CameraTransitionEngine::tick

use crate::easing::Easing;
use crate::error::CameraError;
use crate::recovery::RecoveryOutcome;
use crate::rig::CameraRig;
use crate::settings::{ArcConfig, CameraSettings, DeviceClass, DirectConfig};
use crate::stage::StageId;
use crate::topology::{self, Topology, TopologyFlags};
use crate::transition::{
    TokenSource, TransitionInfo, TransitionPhase, TransitionStatus, TransitionToken,
};
use crate::tween::{Completion, Track, Tween, TweenScheduler};
use crate::viewpoint::{Viewpoint, ViewpointRegistry};
use crate::waypoint::arc_waypoint;
use glam::Vec3;
use pipeview_app_core::notice::NoticeBoard;
use std::time::{Duration, Instant};
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};

/// How far ahead of the camera the gaze is pinned during an arc pull-back.
pub const HOLD_GAZE_DISTANCE: f32 = 10.0;

/// Second half of an arc, queued until the pull-back completes.
#[derive(Debug, Clone, Copy)]
struct ArcApproach {
    waypoint: Vec3,
    destination: Viewpoint,
    duration: Duration,
    easing: Easing,
}

#[derive(Debug)]
struct ActiveTransition {
    token: TransitionToken,
    target: StageId,
    started_at: Instant,
    phase: TransitionPhase,
    phase_started: Instant,
    phase_duration: Duration,
    completion: Completion,
    approach: Option<ArcApproach>,
}

enum PhaseEvent {
    Pending,
    Finished,
    Approach(ArcApproach),
    Dropped,
}

/// The camera transition engine.
///
/// Owned by the composing application and passed by reference to whatever
/// needs [`is_transitioning`](Self::is_transitioning) or
/// [`transition_info`](Self::transition_info).
#[derive(Debug)]
pub struct CameraTransitionEngine<S> {
    pub(crate) settings: CameraSettings,
    pub(crate) device: DeviceClass,
    pub(crate) scheduler: S,
    pub(crate) rig: Option<CameraRig>,
    tokens: TokenSource,
    active: Option<ActiveTransition>,
    pub(crate) current_stage: StageId,
    pub(crate) notices: NoticeBoard,
    pub(crate) last_recovery: Option<RecoveryOutcome>,
}

impl<S> CameraTransitionEngine<S> {
    /// Engine with no camera yet; call [`init_camera`](Self::init_camera)
    /// before animating.
    pub fn new(
        settings: CameraSettings,
        device: DeviceClass,
        scheduler: S,
    ) -> Result<Self, CameraError> {
        settings.validate()?;
        Ok(Self {
            settings,
            device,
            scheduler,
            rig: None,
            tokens: TokenSource::default(),
            active: None,
            current_stage: StageId::overview(),
            notices: NoticeBoard::default(),
            last_recovery: None,
        })
    }

    /// Create the rig at the overview pose.
    pub fn init_camera(&mut self, aspect: f32) -> &CameraRig {
        let overview = *self.settings.viewpoints.overview();
        self.rig.insert(CameraRig::new(overview, &self.settings.lens, aspect))
    }

    /// Replace the rig wholesale (e.g. a host-owned camera).
    ///
    /// Not allowed to race a transition: the active one is dropped first.
    pub fn attach_rig(&mut self, rig: CameraRig)
    where
        S: TweenScheduler,
    {
        self.interrupt_current();
        self.rig = Some(rig);
    }

    /// Current camera, if initialized. Read each frame by the renderer.
    pub fn rig(&self) -> Option<&CameraRig> {
        self.rig.as_ref()
    }

    /// Active configuration.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Registered viewpoints.
    pub fn registry(&self) -> &ViewpointRegistry {
        &self.settings.viewpoints
    }

    /// Device class whose config set is in use.
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Stage most recently requested through [`animate_to`](Self::animate_to).
    pub fn current_stage(&self) -> &StageId {
        &self.current_stage
    }

    /// The injected scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable scheduler access; running tweens stay tagged with their tokens.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// User-facing notices raised by error recovery.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Mutable notices, for hosts that prune or render them.
    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    /// Outcome of the most recent error recovery, if any ran.
    pub fn last_recovery(&self) -> Option<RecoveryOutcome> {
        self.last_recovery
    }

    /// Whether any transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Snapshot of the transition state.
    pub fn transition_info(&self) -> TransitionInfo {
        self.active
            .as_ref()
            .map_or_else(TransitionInfo::idle, |a| TransitionInfo {
                active: true,
                token: Some(a.token),
                phase: a.phase,
                started_at: Some(a.started_at),
                target: Some(a.target.clone()),
            })
    }

    pub(crate) fn direct_config(&self) -> DirectConfig {
        *self.settings.direct_for(self.device)
    }

    pub(crate) fn arc_config(&self) -> ArcConfig {
        *self.settings.arc_for(self.device)
    }
}

impl<S: TweenScheduler> CameraTransitionEngine<S> {
    /// Move the camera to `stage`.
    ///
    /// `duration` overrides the device default for direct transitions; arcs
    /// always use their configured step durations. Returns false when the
    /// request could not be started as asked; in that case error recovery
    /// has already run (fallback transition or user notice).
    pub fn animate_to(&mut self, stage: &str, duration: Option<Duration>, now: Instant) -> bool {
        match self.try_animate_to(stage, duration, now) {
            Ok(()) => true,
            Err(err) => {
                self.recover("animate_to", &StageId::new(stage), &err, now);
                false
            }
        }
    }

    fn try_animate_to(
        &mut self,
        stage: &str,
        duration: Option<Duration>,
        now: Instant,
    ) -> Result<(), CameraError> {
        let destination = *self.settings.viewpoints.lookup(stage)?;
        let rig = self.rig.ok_or(CameraError::Uninitialized)?;
        let target = StageId::new(stage);
        if !rig.is_finite() {
            return Err(CameraError::MalformedPose {
                stage: target,
                detail: "current camera pose is not finite".into(),
            });
        }

        self.interrupt_current();
        let token = self.tokens.next();

        let detection = &self.settings.detection;
        let arc = self.arc_config();
        let topology = topology::decide(rig.position, &destination, detection, arc.enabled);
        debug!(
            token = %token,
            stage = %target,
            flags = ?TopologyFlags::evaluate(rig.position, &destination, detection),
            ?topology,
            "topology decided"
        );

        match topology {
            Topology::Direct => {
                let direct = self.direct_config();
                let duration = duration.unwrap_or(direct.duration);
                let easing = direct.easing;
                self.start_direct(token, target.clone(), destination, duration, easing, now)?;
            }
            Topology::Arc => self.start_arc(token, target.clone(), destination, &arc, now)?,
        }
        // Only a started transition moves the current stage.
        self.current_stage = target;
        Ok(())
    }

    /// Cancel the in-flight transition, if any. Idempotent.
    pub fn interrupt_current(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let cancelled = self.scheduler.cancel(active.token);
        info!(
            token = %active.token,
            phase = %active.phase,
            stage = %active.target,
            cancelled,
            "transition interrupted"
        );
    }

    /// Advance tweens to `now` and move the state machine along.
    ///
    /// Call once per render frame.
    pub fn tick(&mut self, now: Instant) {
        let Some(rig) = self.rig.as_mut() else {
            return;
        };
        self.scheduler.advance(now, rig);

        let event = match self.active.as_mut() {
            None => return,
            Some(active) => match active.completion.try_recv() {
                Err(TryRecvError::Empty) => PhaseEvent::Pending,
                Err(TryRecvError::Closed) => PhaseEvent::Dropped,
                Ok(()) => active
                    .approach
                    .take()
                    .map_or(PhaseEvent::Finished, PhaseEvent::Approach),
            },
        };

        match event {
            PhaseEvent::Pending => {}
            PhaseEvent::Finished => {
                if let Some(done) = self.active.take() {
                    info!(
                        token = %done.token,
                        stage = %done.target,
                        elapsed_ms = millis(now.saturating_duration_since(done.started_at)),
                        "transition complete"
                    );
                }
            }
            PhaseEvent::Dropped => {
                if let Some(lost) = self.active.take() {
                    warn!(
                        token = %lost.token,
                        phase = %lost.phase,
                        "phase tweens vanished from the scheduler; resetting to idle"
                    );
                }
            }
            PhaseEvent::Approach(approach) => {
                if let Err(err) = self.start_arc_approach(approach, now) {
                    let target = self.current_stage.clone();
                    self.recover("arc_step2", &target, &err, now);
                }
            }
        }
    }

    /// Single phase: position and look target ease together to `destination`.
    pub(crate) fn start_direct(
        &mut self,
        token: TransitionToken,
        target: StageId,
        destination: Viewpoint,
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) -> Result<(), CameraError> {
        let rig = self.rig.ok_or(CameraError::Uninitialized)?;
        let detection = &self.settings.detection;
        let leaving_close_up = rig.position.z < detection.close_up_threshold
            && destination.position.z > detection.overview_depth_floor;
        let entering_close_up = rig.position.z > detection.overview_depth_floor
            && destination.position.z < detection.close_up_threshold;
        // Start from where the camera actually looks, re-projected to the
        // destination's focal distance so the sweep covers the same depth.
        let look_from = if leaving_close_up || entering_close_up {
            rig.project_gaze(rig.position.distance(destination.look_at))
        } else {
            rig.look_target
        };

        let completion = self.schedule_phase(
            token,
            Track::Position {
                from: rig.position,
                to: destination.position,
            },
            Track::LookTarget {
                from: look_from,
                to: destination.look_at,
            },
            duration,
            easing,
            now,
        )?;

        info!(
            token = %token,
            stage = %target,
            duration_ms = millis(duration),
            "direct transition started"
        );
        self.active = Some(ActiveTransition {
            token,
            target,
            started_at: now,
            phase: TransitionPhase::Direct,
            phase_started: now,
            phase_duration: duration,
            completion,
            approach: None,
        });
        Ok(())
    }

    /// Arc step 1: pull back to the waypoint with the gaze pinned.
    fn start_arc(
        &mut self,
        token: TransitionToken,
        target: StageId,
        destination: Viewpoint,
        arc: &ArcConfig,
        now: Instant,
    ) -> Result<(), CameraError> {
        let rig = self.rig.ok_or(CameraError::Uninitialized)?;
        let waypoint = arc_waypoint(rig.position, destination.position, arc.zoom_out_distance);
        let gaze = rig.project_gaze(HOLD_GAZE_DISTANCE);

        let completion = self.schedule_phase(
            token,
            Track::Position {
                from: rig.position,
                to: waypoint,
            },
            Track::HoldGaze { point: gaze },
            arc.step1_duration,
            arc.easing,
            now,
        )?;

        info!(
            token = %token,
            stage = %target,
            waypoint = ?waypoint,
            total_ms = millis(arc.total_duration()),
            "arc transition started"
        );
        self.active = Some(ActiveTransition {
            token,
            target,
            started_at: now,
            phase: TransitionPhase::ArcStep1,
            phase_started: now,
            phase_duration: arc.step1_duration,
            completion,
            approach: Some(ArcApproach {
                waypoint,
                destination,
                duration: arc.step2_duration,
                easing: arc.easing,
            }),
        });
        Ok(())
    }

    /// Arc step 2: approach the destination from the waypoint.
    ///
    /// Only reachable from `tick` after the active transition's own step-1
    /// receiver resolved, so the token is necessarily still current.
    fn start_arc_approach(&mut self, approach: ArcApproach, now: Instant) -> Result<(), CameraError> {
        let rig = self.rig.ok_or(CameraError::Uninitialized)?;
        let Some(active) = self.active.as_ref() else {
            return Ok(());
        };
        let token = active.token;
        // Anchor to step 1's nominal end so frame jitter does not stretch the arc.
        let start = (active.phase_started + active.phase_duration).min(now);

        let completion = self.schedule_phase(
            token,
            Track::Position {
                from: approach.waypoint,
                to: approach.destination.position,
            },
            Track::LookTarget {
                from: rig.look_target,
                to: approach.destination.look_at,
            },
            approach.duration,
            approach.easing,
            start,
        )?;

        if let Some(active) = self.active.as_mut() {
            debug!(token = %token, "arc step 2 started");
            active.phase = TransitionPhase::ArcStep2;
            active.phase_started = start;
            active.phase_duration = approach.duration;
            active.completion = completion;
        }
        Ok(())
    }

    /// Schedule the two concurrent tracks of one phase.
    ///
    /// The phase completes when `primary` does. If the second track cannot be
    /// scheduled the first is cancelled again so nothing leaks.
    fn schedule_phase(
        &mut self,
        token: TransitionToken,
        primary: Track,
        secondary: Track,
        duration: Duration,
        easing: Easing,
        start: Instant,
    ) -> Result<Completion, CameraError> {
        let tween = |track| Tween {
            token,
            track,
            duration,
            easing,
        };
        let completion = self.scheduler.schedule(tween(primary), start)?;
        if let Err(err) = self.scheduler.schedule(tween(secondary), start) {
            self.scheduler.cancel(token);
            return Err(err.into());
        }
        Ok(completion)
    }

    /// Apply a viewport change; on a mobile/non-mobile switch, re-pose to the
    /// device-adjusted depth of the current stage.
    pub fn handle_resize(&mut self, width: u32, height: u32, device: DeviceClass, now: Instant) {
        if let Some(rig) = self.rig.as_mut() {
            rig.set_viewport(width, height);
        }
        if device == self.device {
            return;
        }
        let previous = std::mem::replace(&mut self.device, device);
        info!(?previous, ?device, "device class changed");
        if previous.is_mobile() != device.is_mobile() {
            self.adapt_to_device(now);
        }
    }

    fn adapt_to_device(&mut self, now: Instant) {
        if self.is_transitioning() {
            debug!("device re-pose skipped mid-transition");
            return;
        }
        if self.rig.is_none() {
            return;
        }
        let stage = self.current_stage.clone();
        let Ok(viewpoint) = self.settings.viewpoints.lookup(stage.as_str()) else {
            return;
        };
        let mut destination = *viewpoint;
        if self.device.is_mobile() {
            destination.position.z += self.settings.device_adapt.mobile_depth_offset;
        }
        let token = self.tokens.next();
        let duration = self.settings.device_adapt.duration;
        let easing = self.direct_config().easing;
        if let Err(err) = self.start_direct(token, stage.clone(), destination, duration, easing, now)
        {
            self.recover("adapt_to_device", &stage, &err, now);
        }
    }

    pub(crate) fn next_token(&mut self) -> TransitionToken {
        self.tokens.next()
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<S> TransitionStatus for CameraTransitionEngine<S> {
    fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }
}
