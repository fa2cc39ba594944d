// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transition duration prediction for UI timing.

use crate::engine::CameraTransitionEngine;
use crate::rig::CameraRig;
use crate::settings::{CameraSettings, DeviceClass};
use crate::topology::{self, Topology};
use std::time::Duration;

/// Predicts how long a transition would take without starting one.
///
/// Uses the same topology heuristic as the engine, against the camera's
/// position at the time of the call.
#[derive(Debug, Clone, Copy)]
pub struct DurationEstimator<'a> {
    settings: &'a CameraSettings,
    device: DeviceClass,
}

impl<'a> DurationEstimator<'a> {
    /// Estimator over `settings` for `device`'s config set.
    pub const fn new(settings: &'a CameraSettings, device: DeviceClass) -> Self {
        Self { settings, device }
    }

    /// Topology a transition from `camera` to `stage` would take.
    ///
    /// `None` when the camera is missing or the stage unknown.
    pub fn topology(&self, camera: Option<&CameraRig>, stage: &str) -> Option<Topology> {
        let rig = camera?;
        let target = self.settings.viewpoints.lookup(stage).ok()?;
        let arc = self.settings.arc_for(self.device);
        Some(topology::decide(
            rig.position,
            target,
            &self.settings.detection,
            arc.enabled,
        ))
    }

    /// Total expected duration of a transition to `stage`.
    pub fn estimate(&self, camera: Option<&CameraRig>, stage: &str) -> Duration {
        match self.topology(camera, stage) {
            Some(Topology::Arc) => self.settings.arc_for(self.device).total_duration(),
            Some(Topology::Direct) => self.settings.direct_for(self.device).duration,
            None => self.settings.default_estimate,
        }
    }
}

impl<S> CameraTransitionEngine<S> {
    /// Estimator bound to this engine's settings and device class.
    pub const fn estimator(&self) -> DurationEstimator<'_> {
        DurationEstimator::new(&self.settings, self.device)
    }

    /// Expected duration of `animate_to(stage)` from the current pose.
    pub fn estimate(&self, stage: &str) -> Duration {
        self.estimator().estimate(self.rig.as_ref(), stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn rig_at(settings: &CameraSettings, stage: &str) -> CameraRig {
        let pose = *settings.viewpoints.lookup(stage).unwrap();
        CameraRig::new(pose, &settings.lens, 1.5)
    }

    #[test]
    fn missing_camera_uses_default() {
        let settings = CameraSettings::default();
        let est = DurationEstimator::new(&settings, DeviceClass::Desktop);
        assert_eq!(est.estimate(None, "delivery"), Duration::from_secs(2));
        assert_eq!(est.topology(None, "delivery"), None);
    }

    #[test]
    fn unknown_stage_uses_default() {
        let settings = CameraSettings::default();
        let rig = rig_at(&settings, "overview");
        let est = DurationEstimator::new(&settings, DeviceClass::Desktop);
        assert_eq!(est.estimate(Some(&rig), "warehouse"), Duration::from_secs(2));
    }

    #[test]
    fn stage_to_stage_is_arc_total_per_device() {
        let settings = CameraSettings::default();
        let rig = rig_at(&settings, "leadGen");
        let desktop = DurationEstimator::new(&settings, DeviceClass::Desktop);
        let mobile = DurationEstimator::new(&settings, DeviceClass::Mobile);
        assert_eq!(desktop.estimate(Some(&rig), "retention"), Duration::from_millis(2400));
        assert_eq!(mobile.estimate(Some(&rig), "retention"), Duration::from_millis(1600));
    }

    #[test]
    fn overview_moves_are_direct() {
        let settings = CameraSettings::default();
        let rig = rig_at(&settings, "overview");
        let est = DurationEstimator::new(&settings, DeviceClass::Tablet);
        assert_eq!(est.topology(Some(&rig), "onboarding"), Some(Topology::Direct));
        assert_eq!(est.estimate(Some(&rig), "onboarding"), Duration::from_secs(2));
    }

    #[test]
    fn follows_the_actual_camera_position() {
        let settings = CameraSettings::default();
        // Neighbouring stages closer than the lateral minimum go direct.
        let mut rig = rig_at(&settings, "onboarding");
        rig.position = Vec3::new(2.0, -2.4, 2.0);
        let est = DurationEstimator::new(&settings, DeviceClass::Desktop);
        assert_eq!(est.topology(Some(&rig), "delivery"), Some(Topology::Direct));

        rig.position = Vec3::new(-6.0, -2.4, 2.0);
        assert_eq!(est.topology(Some(&rig), "delivery"), Some(Topology::Arc));
    }
}
