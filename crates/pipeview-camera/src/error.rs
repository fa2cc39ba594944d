// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for the camera engine.

use crate::stage::StageId;
use crate::tween::TweenError;
use thiserror::Error;

/// Message shown when the visualization cannot start at all.
pub const REFRESH_MESSAGE: &str =
    "The pipeline view could not be loaded. Please refresh the page.";

/// Message shown when a camera move failed and could not be recovered.
pub const RETRY_MESSAGE: &str = "We couldn't move the view just now. Please try again.";

/// Errors raised inside the camera engine.
///
/// Everything except [`CameraError::Init`] is recovered locally by the
/// engine's fallback path and never reaches callers of `animate_to`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    /// No viewpoint is registered for the stage.
    #[error("unknown stage `{0}`")]
    UnknownStage(StageId),
    /// The camera rig has not been created yet.
    #[error("camera not initialized")]
    Uninitialized,
    /// A pose contains NaN or infinite components.
    #[error("malformed pose for `{stage}`: {detail}")]
    MalformedPose {
        /// Stage whose pose was rejected.
        stage: StageId,
        /// What was wrong.
        detail: String,
    },
    /// The tween scheduler refused or failed a phase.
    #[error("scheduler failure: {0}")]
    Scheduler(#[from] TweenError),
    /// Required scene configuration is absent or inconsistent.
    #[error("initialization failed: {0}")]
    Init(String),
}

impl CameraError {
    /// Non-technical text suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Init(_) | Self::Uninitialized => REFRESH_MESSAGE,
            _ => RETRY_MESSAGE,
        }
    }

    /// Whether the error is fatal for the visualization (scene objects absent).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Init(_) | Self::Uninitialized)
    }
}
