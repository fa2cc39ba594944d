// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use pipeview_camera::{
    CameraRig, CameraSettings, CameraTransitionEngine, Completion, DeviceClass, TransitionToken,
    Tween, TweenError, TweenScheduler, TweenTimeline,
};
use pipeview_dry_tests::FrameClock;
use std::time::Instant;

/// Timeline that refuses the next `fail_next` schedule calls.
#[derive(Debug, Default)]
pub struct FlakyScheduler {
    pub inner: TweenTimeline,
    pub fail_next: usize,
    pub scheduled: usize,
}

impl FlakyScheduler {
    pub fn failing(times: usize) -> Self {
        Self {
            fail_next: times,
            ..Self::default()
        }
    }
}

impl TweenScheduler for FlakyScheduler {
    fn schedule(&mut self, tween: Tween, start: Instant) -> Result<Completion, TweenError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TweenError::Unavailable("injected failure".into()));
        }
        self.scheduled += 1;
        self.inner.schedule(tween, start)
    }

    fn cancel(&mut self, token: TransitionToken) -> usize {
        self.inner.cancel(token)
    }

    fn advance(&mut self, now: Instant, rig: &mut CameraRig) {
        self.inner.advance(now, rig);
    }

    fn pending(&self, token: TransitionToken) -> usize {
        self.inner.pending(token)
    }
}

pub type TestEngine = CameraTransitionEngine<FlakyScheduler>;

pub fn engine_with(settings: CameraSettings, device: DeviceClass) -> TestEngine {
    let mut engine = CameraTransitionEngine::new(settings, device, FlakyScheduler::default())
        .expect("valid settings");
    engine.init_camera(16.0 / 9.0);
    engine
}

pub fn engine() -> TestEngine {
    engine_with(CameraSettings::default(), DeviceClass::Desktop)
}

/// Tick until idle; returns the number of frames ticked.
pub fn run_until_idle<S: TweenScheduler>(
    engine: &mut CameraTransitionEngine<S>,
    clock: &mut FrameClock,
) -> u32 {
    let mut frames = 0;
    while engine.is_transitioning() {
        assert!(frames < 10_000, "transition never finished");
        engine.tick(clock.tick());
        frames += 1;
    }
    frames
}

/// Move to `stage` and let the transition finish.
pub fn settle_at<S: TweenScheduler>(
    engine: &mut CameraTransitionEngine<S>,
    clock: &mut FrameClock,
    stage: &str,
) {
    assert!(engine.animate_to(stage, None, clock.now()), "could not start {stage}");
    run_until_idle(engine, clock);
}
