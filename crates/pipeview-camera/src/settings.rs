// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Static camera configuration, per device class.
//!
//! Everything here is read-only once the engine is built. Durations are
//! serialized as integer milliseconds so the JSON stays hand-editable.

use crate::easing::Easing;
use crate::error::CameraError;
use crate::viewpoint::ViewpointRegistry;
use pipeview_app_core::config::{ConfigService, ConfigStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Device class reported by the host's detection heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Narrow viewport.
    Mobile,
    /// Mid-sized viewport; uses the desktop configuration set.
    Tablet,
    /// Wide viewport.
    #[default]
    Desktop,
}

impl DeviceClass {
    /// Whether the mobile configuration set applies.
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// A value with one variant for mobile and one for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerDevice<T> {
    /// Used when [`DeviceClass::Mobile`].
    pub mobile: T,
    /// Used for tablet and desktop.
    pub desktop: T,
}

impl<T> PerDevice<T> {
    /// The variant for `device`.
    pub fn for_class(&self, device: DeviceClass) -> &T {
        if device.is_mobile() {
            &self.mobile
        } else {
            &self.desktop
        }
    }
}

/// Single-phase transition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectConfig {
    /// Default transition duration.
    #[serde(rename = "duration_ms", with = "millis")]
    pub duration: Duration,
    /// Easing for position and look target.
    pub easing: Easing,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(2),
            easing: Easing::Power2InOut,
        }
    }
}

/// Two-phase (arc) transition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcConfig {
    /// Whether arcs may be used on this device class at all.
    pub enabled: bool,
    /// Extra depth added to the waypoint.
    pub zoom_out_distance: f32,
    /// Duration of the pull-back phase.
    #[serde(rename = "step1_ms", with = "millis")]
    pub step1_duration: Duration,
    /// Duration of the approach phase.
    #[serde(rename = "step2_ms", with = "millis")]
    pub step2_duration: Duration,
    /// Easing for both phases.
    pub easing: Easing,
}

impl ArcConfig {
    /// Sum of both phases.
    pub fn total_duration(&self) -> Duration {
        self.step1_duration + self.step2_duration
    }
}

/// Thresholds of the topology heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcDetection {
    /// Master switch; when off every transition is direct.
    pub enabled: bool,
    /// Depth below which a pose counts as close-up.
    pub close_up_threshold: f32,
    /// Minimum |dx| between endpoints for an arc.
    pub min_lateral_distance: f32,
    /// Depth above which a pose counts as overview.
    pub overview_depth_floor: f32,
}

impl Default for ArcDetection {
    fn default() -> Self {
        Self {
            enabled: true,
            close_up_threshold: 5.0,
            min_lateral_distance: 1.5,
            overview_depth_floor: 10.0,
        }
    }
}

/// Perspective parameters of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Throttling and UI-timing knobs used by the guard and navigator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Minimum time between two transition starts.
    #[serde(rename = "min_interval_ms", with = "millis")]
    pub min_interval: Duration,
    /// Extra time the guard stays busy past the estimated duration.
    #[serde(rename = "settle_margin_ms", with = "millis")]
    pub settle_margin: Duration,
    /// Retry delay for a reset requested mid-transition.
    #[serde(rename = "reset_retry_ms", with = "millis")]
    pub reset_retry: Duration,
    /// Fraction of the estimate after which overview overlays reappear.
    pub overlay_reveal_fraction: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            settle_margin: Duration::from_millis(200),
            reset_retry: Duration::from_millis(100),
            overlay_reveal_fraction: 0.8,
        }
    }
}

/// Error-recovery knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Duration of the direct fallback transition.
    #[serde(rename = "fallback_ms", with = "millis")]
    pub fallback_duration: Duration,
    /// How long user notices stay visible.
    #[serde(rename = "notice_ttl_ms", with = "millis")]
    pub notice_ttl: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            fallback_duration: Duration::from_secs(1),
            notice_ttl: Duration::from_secs(5),
        }
    }
}

/// Re-pose applied when the device class changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceAdaptConfig {
    /// Depth added to the current stage's pose on mobile.
    pub mobile_depth_offset: f32,
    /// Duration of the re-pose.
    #[serde(rename = "duration_ms", with = "millis")]
    pub duration: Duration,
}

impl Default for DeviceAdaptConfig {
    fn default() -> Self {
        Self {
            mobile_depth_offset: 3.0,
            duration: Duration::from_millis(1500),
        }
    }
}

/// Complete camera configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Stage poses.
    pub viewpoints: ViewpointRegistry,
    /// Projection parameters.
    pub lens: LensConfig,
    /// Direct transitions per device class.
    pub direct: PerDevice<DirectConfig>,
    /// Arc transitions per device class.
    pub arc: PerDevice<ArcConfig>,
    /// Topology thresholds.
    pub detection: ArcDetection,
    /// Throttling and UI timing.
    pub guard: GuardConfig,
    /// Error recovery.
    pub recovery: RecoveryConfig,
    /// Device-change re-pose.
    pub device_adapt: DeviceAdaptConfig,
    /// Estimate returned when the topology cannot be evaluated.
    #[serde(rename = "default_estimate_ms", with = "millis")]
    pub default_estimate: Duration,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            viewpoints: ViewpointRegistry::pipeline(),
            lens: LensConfig::default(),
            direct: PerDevice {
                mobile: DirectConfig::default(),
                desktop: DirectConfig::default(),
            },
            arc: PerDevice {
                mobile: ArcConfig {
                    enabled: true,
                    zoom_out_distance: 2.0,
                    step1_duration: Duration::from_millis(800),
                    step2_duration: Duration::from_millis(800),
                    easing: Easing::Power1InOut,
                },
                desktop: ArcConfig {
                    enabled: true,
                    zoom_out_distance: 3.0,
                    step1_duration: Duration::from_millis(1200),
                    step2_duration: Duration::from_millis(1200),
                    easing: Easing::Power2InOut,
                },
            },
            detection: ArcDetection::default(),
            guard: GuardConfig::default(),
            recovery: RecoveryConfig::default(),
            device_adapt: DeviceAdaptConfig::default(),
            default_estimate: Duration::from_secs(2),
        }
    }
}

impl CameraSettings {
    /// Key under which settings live in a [`ConfigStore`].
    pub const CONFIG_KEY: &'static str = "camera";

    /// Load from `service`, defaulting when nothing is stored, then validate.
    ///
    /// Any failure is an initialization error: the visualization cannot run
    /// on a config it cannot read.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, CameraError> {
        let settings: Self = service
            .load_or_default(Self::CONFIG_KEY)
            .map_err(|e| CameraError::Init(format!("camera config: {e}")))?;
        settings.validate()?;
        debug!(
            stages = settings.viewpoints.len(),
            "camera settings loaded"
        );
        Ok(settings)
    }

    /// Check cross-field consistency the type system cannot express.
    pub fn validate(&self) -> Result<(), CameraError> {
        let d = &self.detection;
        let finite_positive = |v: f32| v.is_finite() && v > 0.0;
        if !finite_positive(d.close_up_threshold)
            || !finite_positive(d.overview_depth_floor)
            || !d.min_lateral_distance.is_finite()
            || d.min_lateral_distance < 0.0
        {
            return Err(invalid("arc detection thresholds must be finite and positive"));
        }
        if d.close_up_threshold > d.overview_depth_floor {
            return Err(invalid("close-up threshold exceeds the overview depth floor"));
        }
        if self.viewpoints.overview().position.z <= d.overview_depth_floor {
            return Err(invalid("overview viewpoint is not beyond the overview depth floor"));
        }
        for arc in [&self.arc.mobile, &self.arc.desktop] {
            if !arc.zoom_out_distance.is_finite() || arc.zoom_out_distance < 0.0 {
                return Err(invalid("arc zoom-out distance must be finite and non-negative"));
            }
        }
        let lens = &self.lens;
        if !(lens.fov_y_degrees > 0.0 && lens.fov_y_degrees < 180.0)
            || !(lens.near > 0.0 && lens.far > lens.near)
        {
            return Err(invalid("lens parameters out of range"));
        }
        if !(0.0..=1.0).contains(&self.guard.overlay_reveal_fraction) {
            return Err(invalid("overlay reveal fraction must lie in [0, 1]"));
        }
        if !self.device_adapt.mobile_depth_offset.is_finite() {
            return Err(invalid("mobile depth offset must be finite"));
        }
        Ok(())
    }

    /// Direct config for `device`.
    pub fn direct_for(&self, device: DeviceClass) -> &DirectConfig {
        self.direct.for_class(device)
    }

    /// Arc config for `device`.
    pub fn arc_for(&self, device: DeviceClass) -> &ArcConfig {
        self.arc.for_class(device)
    }
}

fn invalid(reason: &str) -> CameraError {
    CameraError::Init(reason.to_owned())
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
