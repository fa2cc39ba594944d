// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Intermediate pose for arc transitions.

use glam::Vec3;

/// Waypoint between `current` and `target` for the pull-back phase.
///
/// Laterally aligned with the target, at least as high as either endpoint,
/// and `zoom_out` deeper than the deeper endpoint. Non-finite inputs or
/// results fall back to a fixed offset above and behind the target.
pub fn arc_waypoint(current: Vec3, target: Vec3, zoom_out: f32) -> Vec3 {
    let waypoint = Vec3::new(
        target.x,
        current.y.max(target.y),
        current.z.max(target.z) + zoom_out,
    );
    if current.is_finite() && waypoint.is_finite() {
        waypoint
    } else {
        fallback(target)
    }
}

fn fallback(target: Vec3) -> Vec3 {
    target + Vec3::new(0.0, 1.0, 3.0)
}
