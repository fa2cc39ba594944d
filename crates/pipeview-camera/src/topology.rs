// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Direct-vs-arc decision.
//!
//! Shared by the engine and the duration estimator so both always agree. It
//! is evaluated against the camera's actual position at call time, never the
//! last selected stage: an interrupted tween can leave the camera anywhere.

use crate::settings::ArcDetection;
use crate::viewpoint::Viewpoint;
use glam::Vec3;

/// The two transition shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// One phase straight to the target.
    Direct,
    /// Pull back to a waypoint, then approach the target.
    Arc,
}

/// The individual predicates behind a decision, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyFlags {
    /// Current position is close-up.
    pub current_close_up: bool,
    /// Target position is close-up.
    pub target_close_up: bool,
    /// Lateral separation reaches the minimum.
    pub lateral_distance: bool,
    /// Either endpoint is beyond the overview depth floor.
    pub overview: bool,
}

impl TopologyFlags {
    /// Evaluate the predicates for `current -> target`.
    pub fn evaluate(current: Vec3, target: &Viewpoint, detection: &ArcDetection) -> Self {
        let to = target.position;
        Self {
            current_close_up: current.z < detection.close_up_threshold,
            target_close_up: to.z < detection.close_up_threshold,
            lateral_distance: (current.x - to.x).abs() >= detection.min_lateral_distance,
            overview: current.z > detection.overview_depth_floor
                || to.z > detection.overview_depth_floor,
        }
    }

    /// Arc iff not an overview move and both ends are close-up and far apart.
    pub fn topology(self) -> Topology {
        if !self.overview && self.current_close_up && self.target_close_up && self.lateral_distance
        {
            Topology::Arc
        } else {
            Topology::Direct
        }
    }
}

/// Pick the topology for `current -> target`.
///
/// `arc_enabled` folds in the per-device and global switches; when false the
/// answer is always [`Topology::Direct`].
pub fn decide(
    current: Vec3,
    target: &Viewpoint,
    detection: &ArcDetection,
    arc_enabled: bool,
) -> Topology {
    if !(arc_enabled && detection.enabled) {
        return Topology::Direct;
    }
    TopologyFlags::evaluate(current, target, detection).topology()
}
