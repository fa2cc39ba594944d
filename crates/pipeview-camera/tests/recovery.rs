// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

mod common;

use common::{engine, engine_with, run_until_idle, settle_at, FlakyScheduler};
use glam::Vec3;
use pipeview_camera::{
    CameraSettings, CameraTransitionEngine, DeviceClass, RecoveryOutcome, TransitionPhase,
    REFRESH_MESSAGE, RETRY_MESSAGE,
};
use pipeview_dry_tests::{clock::FRAME, FrameClock};
use std::time::Duration;

#[test]
fn scheduler_hiccup_falls_back_to_short_direct_move() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    engine.scheduler_mut().fail_next = 1;

    assert!(!engine.animate_to("delivery", None, clock.now()));
    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::FallbackStarted));
    assert_eq!(engine.transition_info().phase, TransitionPhase::Direct);

    let frames = run_until_idle(&mut engine, &mut clock);
    let fallback = engine.settings().recovery.fallback_duration;
    assert!(FRAME * frames < fallback + FRAME * 2);
    assert_eq!(
        engine.rig().unwrap().pose(),
        *engine.registry().lookup("delivery").unwrap()
    );
    assert!(engine.notices().is_empty());
    assert_eq!(engine.current_stage().as_str(), "delivery");
}

#[test]
fn failed_fallback_raises_notice_and_leaves_camera_alone() {
    let mut engine = engine();
    let clock = FrameClock::default();
    let before = engine.rig().unwrap().pose();
    engine.scheduler_mut().fail_next = 2;

    assert!(!engine.animate_to("delivery", None, clock.now()));
    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::GaveUp));
    assert!(!engine.is_transitioning());
    assert_eq!(engine.rig().unwrap().pose(), before);

    let notice = engine.notices().latest().unwrap();
    assert_eq!(notice.message, RETRY_MESSAGE);
    assert_eq!(notice.ttl, engine.settings().recovery.notice_ttl);
}

#[test]
fn resize_after_a_failed_request_stays_on_the_stage_actually_shown() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    engine.scheduler_mut().fail_next = 2;

    assert!(!engine.animate_to("delivery", None, clock.now()));
    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::GaveUp));
    assert!(engine.current_stage().is_overview());

    engine.handle_resize(390, 844, DeviceClass::Mobile, clock.now());
    run_until_idle(&mut engine, &mut clock);
    let overview = *engine.registry().overview();
    let offset = engine.settings().device_adapt.mobile_depth_offset;
    let rig = engine.rig().unwrap();
    assert_eq!(rig.look_target, overview.look_at);
    assert_eq!(rig.position, overview.position + Vec3::new(0.0, 0.0, offset));
}

#[test]
fn unknown_stage_is_reported_without_moving() {
    let mut engine = engine();
    let clock = FrameClock::default();
    let before = engine.rig().unwrap().pose();

    assert!(!engine.animate_to("warehouse", None, clock.now()));
    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::GaveUp));
    assert_eq!(engine.rig().unwrap().pose(), before);
    assert_eq!(engine.notices().len(), 1);
    assert_eq!(engine.scheduler().scheduled, 0);
}

#[test]
fn failure_kills_the_transition_in_flight() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    engine.animate_to("delivery", None, clock.now());
    let first = engine.transition_info().token.unwrap();
    for _ in 0..20 {
        engine.tick(clock.tick());
    }

    engine.scheduler_mut().fail_next = 2;
    assert!(!engine.animate_to("onboarding", None, clock.now()));
    assert!(!engine.is_transitioning());
    assert!(engine.scheduler().inner.is_empty());

    // Whatever pose the interrupted move reached is kept.
    let held = engine.rig().unwrap().pose();
    engine.tick(clock.tick());
    assert_eq!(engine.rig().unwrap().pose(), held);
    assert_ne!(engine.transition_info().token, Some(first));
}

#[test]
fn step_two_failure_recovers_to_the_arc_target() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "leadGen");

    assert!(engine.animate_to("retention", None, clock.now()));
    engine.tick(clock.tick());
    engine.scheduler_mut().fail_next = 1;
    while engine.transition_info().phase == TransitionPhase::ArcStep1 {
        engine.tick(clock.tick());
    }

    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::FallbackStarted));
    assert_eq!(engine.transition_info().phase, TransitionPhase::Direct);
    run_until_idle(&mut engine, &mut clock);
    assert_eq!(
        engine.rig().unwrap().pose(),
        *engine.registry().lookup("retention").unwrap()
    );
}

#[test]
fn corrupted_pose_gives_up_cleanly() {
    let mut engine = engine();
    let clock = FrameClock::default();
    let mut rig = *engine.rig().unwrap();
    rig.position = Vec3::new(f32::NAN, 0.0, 4.0);
    engine.attach_rig(rig);

    assert!(!engine.animate_to("delivery", None, clock.now()));
    assert_eq!(engine.last_recovery(), Some(RecoveryOutcome::GaveUp));
    assert!(!engine.is_transitioning());
    assert!(engine.notices().latest().is_some());
}

#[test]
fn missing_camera_asks_for_a_refresh() {
    let mut engine = CameraTransitionEngine::new(
        CameraSettings::default(),
        DeviceClass::Mobile,
        FlakyScheduler::default(),
    )
    .unwrap();
    let clock = FrameClock::default();

    assert!(!engine.animate_to("delivery", None, clock.now()));
    assert_eq!(engine.notices().latest().unwrap().message, REFRESH_MESSAGE);
    assert_eq!(engine.estimate("delivery"), Duration::from_secs(2));
}

#[test]
fn mobile_fallback_uses_the_same_short_move() {
    let mut engine = engine_with(CameraSettings::default(), DeviceClass::Mobile);
    let mut clock = FrameClock::default();
    engine.scheduler_mut().fail_next = 1;

    assert!(!engine.animate_to("onboarding", None, clock.now()));
    let frames = run_until_idle(&mut engine, &mut clock);
    assert!(FRAME * frames >= engine.settings().recovery.fallback_duration);
}
