// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The camera rig: the one piece of mutable state transitions write.

use crate::settings::LensConfig;
use crate::viewpoint::Viewpoint;
use glam::{Mat4, Vec3};

/// Perspective camera described by a position and an explicit look target.
///
/// Orientation is always derived from `look_target - position`, so the
/// "current viewing direction" is exact even after an interrupted tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// World-space position.
    pub position: Vec3,
    /// World-space point the camera aims at.
    pub look_target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl CameraRig {
    /// Rig placed at `pose` with the given lens and aspect ratio.
    pub fn new(pose: Viewpoint, lens: &LensConfig, aspect: f32) -> Self {
        Self {
            position: pose.position,
            look_target: pose.look_at,
            fov_y: lens.fov_y_degrees.to_radians(),
            aspect: sanitize_aspect(aspect),
            near: lens.near,
            far: lens.far,
        }
    }

    /// Current pose.
    pub fn pose(&self) -> Viewpoint {
        Viewpoint::new(self.position, self.look_target)
    }

    /// Unit forward vector; falls back to -Z when position and target coincide.
    pub fn forward(&self) -> Vec3 {
        let dir = (self.look_target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            dir
        }
    }

    /// Point `distance` units ahead along the current viewing direction.
    pub fn project_gaze(&self, distance: f32) -> Vec3 {
        self.position + self.forward() * distance
    }

    /// Aim at `point`.
    pub fn aim(&mut self, point: Vec3) {
        self.look_target = point;
    }

    /// Update the aspect ratio from a viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        #[allow(clippy::cast_precision_loss)]
        let aspect = width as f32 / height.max(1) as f32;
        self.aspect = sanitize_aspect(aspect);
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.look_target.is_finite()
    }

    /// Combined projection * view matrix for the renderer.
    pub fn view_proj(&self) -> Mat4 {
        let up = if self.forward().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let eye_target = self.position + self.forward();
        let view = Mat4::look_at_rh(self.position, eye_target, up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() {
        aspect.max(0.1)
    } else {
        1.0
    }
}
