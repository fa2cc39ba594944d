// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

mod common;

use common::{engine, engine_with, settle_at};
use glam::Vec3;
use pipeview_camera::{
    arc_waypoint, decide, ArcDetection, CameraSettings, DeviceClass, StageId, Topology,
    TransitionPhase, Viewpoint, ViewpointRegistry,
};
use pipeview_dry_tests::FrameClock;
use std::collections::BTreeMap;

fn stage_x(id: &str) -> Option<f32> {
    match id {
        "leadGen" => Some(-6.0),
        "qualification" => Some(-3.0),
        "onboarding" => Some(0.0),
        "delivery" => Some(3.0),
        "retention" => Some(6.0),
        _ => None,
    }
}

#[test]
fn every_pair_of_stock_viewpoints() {
    let registry = ViewpointRegistry::pipeline();
    let detection = ArcDetection::default();

    for (from_id, from) in registry.iter() {
        for (to_id, to) in registry.iter() {
            let got = decide(from.position, to, &detection, true);
            // Stage to stage is always at least 3 apart laterally; anything
            // involving the overview (or staying put) goes direct.
            let expected = match (stage_x(from_id.as_str()), stage_x(to_id.as_str())) {
                (Some(a), Some(b)) if a != b => Topology::Arc,
                _ => Topology::Direct,
            };
            assert_eq!(got, expected, "{from_id} -> {to_id}");
        }
    }
}

#[test]
fn animate_to_follows_the_same_table() {
    let ids: Vec<StageId> = ViewpointRegistry::pipeline().iter().map(|(id, _)| id.clone()).collect();

    for from in &ids {
        for to in &ids {
            let mut engine = engine();
            let mut clock = FrameClock::default();
            settle_at(&mut engine, &mut clock, from.as_str());

            assert!(engine.animate_to(to.as_str(), None, clock.now()), "{from} -> {to}");
            let expected = match (stage_x(from.as_str()), stage_x(to.as_str())) {
                (Some(a), Some(b)) if a != b => TransitionPhase::ArcStep1,
                _ => TransitionPhase::Direct,
            };
            assert_eq!(engine.transition_info().phase, expected, "{from} -> {to}");
        }
    }
}

#[test]
fn disabled_arc_forces_direct() {
    let registry = ViewpointRegistry::pipeline();
    let from = registry.lookup("leadGen").unwrap();
    let to = registry.lookup("retention").unwrap();

    assert_eq!(decide(from.position, to, &ArcDetection::default(), false), Topology::Direct);
    let off = ArcDetection {
        enabled: false,
        ..ArcDetection::default()
    };
    assert_eq!(decide(from.position, to, &off, true), Topology::Direct);
}

fn wide_rig_settings() -> CameraSettings {
    let entries = BTreeMap::from([
        (
            StageId::overview(),
            Viewpoint::new(Vec3::new(0.0, 3.0, 13.0), Vec3::ZERO),
        ),
        (
            StageId::from("left"),
            Viewpoint::new(Vec3::new(-6.0, -1.0, 6.0), Vec3::new(-6.0, 2.0, 0.0)),
        ),
        (
            StageId::from("right"),
            Viewpoint::new(Vec3::new(6.0, -1.0, 6.0), Vec3::new(6.0, 2.0, 0.0)),
        ),
    ]);
    let mut settings = CameraSettings {
        viewpoints: ViewpointRegistry::new(entries).unwrap(),
        ..CameraSettings::default()
    };
    settings.detection.close_up_threshold = 8.0;
    settings
}

#[test]
fn wide_stage_hop_arcs_through_pulled_back_waypoint() {
    let settings = wide_rig_settings();
    let zoom = settings.arc.desktop.zoom_out_distance;
    let mut engine = engine_with(settings, DeviceClass::Desktop);
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "left");
    assert_eq!(engine.rig().unwrap().position, Vec3::new(-6.0, -1.0, 6.0));

    assert!(engine.animate_to("right", None, clock.now()));
    assert_eq!(engine.transition_info().phase, TransitionPhase::ArcStep1);

    while engine.transition_info().phase == TransitionPhase::ArcStep1 {
        engine.tick(clock.tick());
    }
    assert_eq!(engine.transition_info().phase, TransitionPhase::ArcStep2);
    // Step 1 lands on the waypoint before step 2 takes over.
    assert_eq!(engine.rig().unwrap().position, Vec3::new(6.0, -1.0, 6.0 + zoom));
    assert_eq!(
        arc_waypoint(Vec3::new(-6.0, -1.0, 6.0), Vec3::new(6.0, -1.0, 6.0), zoom),
        Vec3::new(6.0, -1.0, 9.0)
    );
}

#[test]
fn overview_to_close_up_is_direct() {
    let settings = wide_rig_settings();
    let mut engine = engine_with(settings, DeviceClass::Desktop);
    let clock = FrameClock::default();

    assert!(engine.animate_to("right", None, clock.now()));
    assert_eq!(engine.transition_info().phase, TransitionPhase::Direct);
}

#[test]
fn interrupted_camera_is_judged_where_it_stands() {
    let mut engine = engine_with(CameraSettings::default(), DeviceClass::Desktop);
    let mut clock = FrameClock::default();
    settle_at(&mut engine, &mut clock, "leadGen");

    // Head for the overview, then change course about halfway up.
    engine.animate_to("overview", None, clock.now());
    for _ in 0..60 {
        engine.tick(clock.tick());
    }
    let z = engine.rig().unwrap().position.z;
    assert!(z > 5.0, "camera should have left close-up range, z = {z}");

    assert!(engine.animate_to("retention", None, clock.now()));
    assert_eq!(engine.transition_info().phase, TransitionPhase::Direct);
}
