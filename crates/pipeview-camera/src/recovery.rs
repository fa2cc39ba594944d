// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error recovery for engine operations.
//!
//! Any failure inside the engine ends up here: the in-flight transition is
//! killed, one short direct transition to the requested stage is attempted,
//! and if even that fails the user gets a plain-language notice while the
//! camera stays wherever it is. Nothing propagates out.

use crate::engine::CameraTransitionEngine;
use crate::error::CameraError;
use crate::stage::StageId;
use crate::tween::TweenScheduler;
use pipeview_app_core::notice::NoticeKind;
use std::time::Instant;
use tracing::{error, warn};

/// What recovery managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// A direct fallback transition is running.
    FallbackStarted,
    /// The fallback failed too; a notice was raised and the camera left alone.
    GaveUp,
}

impl<S: TweenScheduler> CameraTransitionEngine<S> {
    /// Handle a failed engine `operation` aimed at `target`.
    pub(crate) fn recover(
        &mut self,
        operation: &'static str,
        target: &StageId,
        failure: &CameraError,
        now: Instant,
    ) -> RecoveryOutcome {
        error!(operation, stage = %target, error = %failure, "camera operation failed");
        self.interrupt_current();

        let outcome = match self.start_fallback(target, now) {
            Ok(()) => {
                self.current_stage = target.clone();
                warn!(
                    stage = %target,
                    duration_ms = crate::engine::millis(self.settings.recovery.fallback_duration),
                    "fallback transition started"
                );
                RecoveryOutcome::FallbackStarted
            }
            Err(fallback) => {
                error!(
                    stage = %target,
                    error = %fallback,
                    "fallback transition failed; camera left in place"
                );
                let ttl = self.settings.recovery.notice_ttl;
                self.notices
                    .push(NoticeKind::Error, fallback.user_message(), ttl, now);
                RecoveryOutcome::GaveUp
            }
        };
        self.last_recovery = Some(outcome);
        outcome
    }

    fn start_fallback(&mut self, target: &StageId, now: Instant) -> Result<(), CameraError> {
        let destination = *self.settings.viewpoints.lookup(target.as_str())?;
        let duration = self.settings.recovery.fallback_duration;
        let easing = self.direct_config().easing;
        let token = self.next_token();
        self.start_direct(token, target.clone(), destination, duration, easing, now)
    }
}
