// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

mod common;

use approx::assert_relative_eq;
use common::{engine, engine_with, run_until_idle, settle_at};
use glam::Vec3;
use pipeview_camera::{CameraSettings, DeviceClass, TransitionInfo, TweenScheduler};
use pipeview_dry_tests::{clock::FRAME, FrameClock};
use std::time::Duration;

#[test]
fn interrupt_while_idle_is_a_no_op() {
    let mut engine = engine();
    let before = *engine.rig().unwrap();
    engine.interrupt_current();
    engine.interrupt_current();
    assert_eq!(engine.transition_info(), TransitionInfo::idle());
    assert_eq!(*engine.rig().unwrap(), before);
    assert_eq!(engine.scheduler().inner.len(), 0);
}

#[test]
fn restart_keeps_exactly_one_transition_alive() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "leadGen");

    engine.animate_to("retention", None, clock.now());
    let first = engine.transition_info().token.unwrap();
    for _ in 0..10 {
        engine.tick(clock.tick());
    }

    engine.animate_to("qualification", None, clock.now());
    let second = engine.transition_info().token.unwrap();
    assert_ne!(first, second);
    assert_eq!(engine.scheduler().pending(first), 0);
    assert_eq!(engine.scheduler().pending(second), 2);
    assert_eq!(engine.scheduler().inner.len(), 2);

    // Nothing from the superseded arc may take over again.
    while engine.is_transitioning() {
        engine.tick(clock.tick());
        let info = engine.transition_info();
        if info.active {
            assert_eq!(info.token, Some(second));
        }
    }
    let target = *engine.registry().lookup("qualification").unwrap();
    assert_eq!(engine.rig().unwrap().pose(), target);
    assert!(engine.scheduler().inner.is_empty());
}

#[test]
fn rapid_retargeting_never_leaks_tweens() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "onboarding");

    for stage in ["leadGen", "retention", "overview", "delivery", "qualification"] {
        assert!(engine.animate_to(stage, None, clock.now()));
        engine.tick(clock.tick());
        assert_eq!(engine.scheduler().inner.len(), 2);
    }
    run_until_idle(&mut engine, &mut clock);
    assert_eq!(
        engine.rig().unwrap().pose(),
        *engine.registry().lookup("qualification").unwrap()
    );
}

fn measured(frames: u32) -> Duration {
    FRAME * frames
}

#[test]
fn estimate_matches_measured_duration() {
    for device in [DeviceClass::Desktop, DeviceClass::Mobile] {
        let mut engine = engine_with(CameraSettings::default(), device);
        let mut clock = FrameClock::default();
        settle_at(&mut engine, &mut clock, "leadGen");

        for stage in ["delivery", "overview", "qualification"] {
            let estimate = engine.estimate(stage);
            assert!(engine.animate_to(stage, None, clock.now()));
            let took = measured(run_until_idle(&mut engine, &mut clock));
            assert!(
                took >= estimate && took < estimate + FRAME * 2,
                "{device:?} -> {stage}: estimated {estimate:?}, took {took:?}"
            );
        }
    }
}

#[test]
fn mobile_arc_is_shorter_than_desktop() {
    let mut desktop = engine_with(CameraSettings::default(), DeviceClass::Desktop);
    let mut mobile = engine_with(CameraSettings::default(), DeviceClass::Mobile);
    let mut clock = FrameClock::default();
    settle_at(&mut desktop, &mut clock, "leadGen");
    settle_at(&mut mobile, &mut clock, "leadGen");
    assert_eq!(desktop.estimate("retention"), Duration::from_millis(2400));
    assert_eq!(mobile.estimate("retention"), Duration::from_millis(1600));
}

#[test]
fn overview_round_trip_lands_exactly() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    let overview = *engine.registry().overview();

    settle_at(&mut engine, &mut clock, "delivery");
    settle_at(&mut engine, &mut clock, "overview");
    let rig = engine.rig().unwrap();
    assert_eq!(rig.pose(), overview);
    assert_relative_eq!(rig.forward().length(), 1.0, epsilon = 1e-6);
}

#[test]
fn direct_look_target_sweeps_without_a_snap() {
    let mut engine = engine();
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "retention");
    let before = engine.rig().unwrap().forward();

    engine.animate_to("overview", None, clock.now());
    engine.tick(clock.tick());
    let after = engine.rig().unwrap().forward();
    // One frame into the move the view direction has barely changed.
    assert!(before.angle_between(after) < 0.05, "snapped by {} rad", before.angle_between(after));
}

#[test]
fn entering_a_close_up_starts_from_the_actual_gaze() {
    let mut engine = engine();
    let clock = FrameClock::default();
    // Overview position, but looking further down the same axis.
    let mut rig = *engine.rig().unwrap();
    rig.look_target = Vec3::new(0.0, 0.0, -20.0);
    engine.attach_rig(rig);
    let before = rig.forward();
    let destination = *engine.registry().lookup("delivery").unwrap();

    assert!(engine.animate_to("delivery", None, clock.now()));
    engine.tick(clock.now() + FRAME);
    let after = *engine.rig().unwrap();
    assert!(before.angle_between(after.forward()) < 0.05);
    // The sweep begins at the destination's focal distance along the old
    // view ray, not at the far-off previous look target.
    assert_relative_eq!(
        after.position.distance(after.look_target),
        rig.position.distance(destination.look_at),
        epsilon = 0.1
    );
}
