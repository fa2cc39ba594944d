// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named camera poses, one per pipeline stage plus the overview.

use crate::error::CameraError;
use crate::stage::StageId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A camera pose: where the camera sits and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    /// World-space camera position.
    pub position: Vec3,
    /// World-space look target.
    pub look_at: Vec3,
}

impl Viewpoint {
    /// Pose at `position` looking at `look_at`.
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Whether both vectors are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.look_at.is_finite()
    }
}

/// Read-only `StageId -> Viewpoint` lookup.
///
/// Construction enforces that the overview exists, that every pose is
/// finite, and that the overview sits strictly deeper (larger z) than every
/// other viewpoint. Iteration order is the sorted stage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<StageId, Viewpoint>",
    into = "BTreeMap<StageId, Viewpoint>"
)]
pub struct ViewpointRegistry {
    entries: BTreeMap<StageId, Viewpoint>,
}

impl ViewpointRegistry {
    /// Validate and wrap `entries`.
    pub fn new(entries: BTreeMap<StageId, Viewpoint>) -> Result<Self, CameraError> {
        let overview = entries
            .get(StageId::OVERVIEW)
            .ok_or_else(|| CameraError::Init("no `overview` viewpoint registered".into()))?;

        if let Some((stage, _)) = entries.iter().find(|(_, vp)| !vp.is_finite()) {
            return Err(CameraError::Init(format!(
                "viewpoint `{stage}` has non-finite components"
            )));
        }

        if let Some((stage, _)) = entries
            .iter()
            .find(|(id, vp)| !id.is_overview() && vp.position.z >= overview.position.z)
        {
            return Err(CameraError::Init(format!(
                "viewpoint `{stage}` is not closer than the overview"
            )));
        }

        Ok(Self { entries })
    }

    /// The stock pipeline: overview plus five stages laid out along x.
    pub fn pipeline() -> Self {
        let stage = |x: f32| Viewpoint::new(Vec3::new(x, -2.4, 2.0), Vec3::new(x, 2.5, 0.0));
        let entries = BTreeMap::from([
            (
                StageId::overview(),
                Viewpoint::new(Vec3::new(0.0, 3.0, 13.0), Vec3::ZERO),
            ),
            (StageId::from("leadGen"), stage(-6.0)),
            (StageId::from("qualification"), stage(-3.0)),
            (StageId::from("onboarding"), stage(0.0)),
            (StageId::from("delivery"), stage(3.0)),
            (StageId::from("retention"), stage(6.0)),
        ]);
        Self { entries }
    }

    /// Viewpoint registered for `stage`.
    pub fn lookup(&self, stage: &str) -> Result<&Viewpoint, CameraError> {
        self.entries
            .get(stage)
            .ok_or_else(|| CameraError::UnknownStage(StageId::new(stage)))
    }

    /// The overview viewpoint (always present).
    pub fn overview(&self) -> &Viewpoint {
        // Presence is checked in `new`; the stock table always has it.
        &self.entries[StageId::OVERVIEW]
    }

    /// Whether `stage` is registered.
    pub fn contains(&self, stage: &str) -> bool {
        self.entries.contains_key(stage)
    }

    /// All registered stages, sorted.
    pub fn stages(&self) -> impl Iterator<Item = &StageId> + '_ {
        self.entries.keys()
    }

    /// All `(stage, viewpoint)` pairs, sorted by stage.
    pub fn iter(&self) -> impl Iterator<Item = (&StageId, &Viewpoint)> + '_ {
        self.entries.iter()
    }

    /// Number of registered viewpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated registry; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ViewpointRegistry {
    fn default() -> Self {
        Self::pipeline()
    }
}

impl TryFrom<BTreeMap<StageId, Viewpoint>> for ViewpointRegistry {
    type Error = CameraError;

    fn try_from(entries: BTreeMap<StageId, Viewpoint>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ViewpointRegistry> for BTreeMap<StageId, Viewpoint> {
    fn from(registry: ViewpointRegistry) -> Self {
        registry.entries
    }
}
