// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-interval render loop replaying scripted stage clicks.

use anyhow::Result;
use pipeview_camera::{
    DeviceClass, FeedbackPort, NavigatorEvent, Selection, StageId, StageNavigator, TweenTimeline,
};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Word in a script that asks for a reset instead of a stage.
pub const RESET: &str = "reset";

/// Tab feedback rendered as log lines.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackPort for LogFeedback {
    type Handle = String;

    fn mark_transitioning(&mut self, handle: &String) {
        debug!(tab = %handle, "tab moving");
    }

    fn clear_transitioning(&mut self, handle: &String) {
        debug!(tab = %handle, "tab settled");
    }

    fn activate(&mut self, handle: &String) {
        info!(tab = %handle, "tab active");
    }
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Click on a stage tab.
    Select(String),
    /// Ask to return to the overview.
    Reset,
    /// Switch the viewport (and its device class).
    Resize {
        /// Viewport width in pixels.
        width: u32,
        /// Viewport height in pixels.
        height: u32,
        /// Device class of the new viewport.
        device: DeviceClass,
    },
}

impl Input {
    /// Parse one script word: a stage id, `reset`, or `@mobile`,
    /// `@tablet`, `@desktop` for a viewport switch.
    pub fn parse(word: &str) -> Self {
        let resize = |width, height, device| Self::Resize {
            width,
            height,
            device,
        };
        match word {
            RESET => Self::Reset,
            "@mobile" => resize(390, 844, DeviceClass::Mobile),
            "@tablet" => resize(820, 1180, DeviceClass::Tablet),
            "@desktop" => resize(1440, 900, DeviceClass::Desktop),
            stage => Self::Select(stage.to_owned()),
        }
    }
}

/// Tally of what the run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Frames ticked.
    pub frames: u64,
    /// Selections that started a transition.
    pub started: u32,
    /// Selections refused by the guard.
    pub throttled: u32,
    /// Selections the engine could not start.
    pub failed: u32,
    /// Resets postponed at least once.
    pub deferred: u32,
}

impl Summary {
    fn record(&mut self, selection: Selection) {
        match selection {
            Selection::Started(_) => self.started += 1,
            Selection::Throttled => self.throttled += 1,
            Selection::Failed => self.failed += 1,
            Selection::Deferred => self.deferred += 1,
        }
    }
}

/// Owns the navigator and feeds it ticks and scripted input.
pub struct Driver {
    navigator: StageNavigator<TweenTimeline, LogFeedback>,
    tick: Duration,
    input_every: Duration,
    log_every: u64,
    script: VecDeque<Input>,
    summary: Summary,
}

impl Driver {
    /// Driver over `navigator`, applying one `script` input every
    /// `input_every` and ticking every `tick`.
    pub fn new(
        navigator: StageNavigator<TweenTimeline, LogFeedback>,
        tick: Duration,
        input_every: Duration,
        script: impl IntoIterator<Item = Input>,
    ) -> Self {
        Self {
            navigator,
            tick,
            input_every,
            log_every: 30,
            script: script.into_iter().collect(),
            summary: Summary::default(),
        }
    }

    /// Log the camera pose every `frames` frames (0 disables).
    pub fn log_every(mut self, frames: u64) -> Self {
        self.log_every = frames;
        self
    }

    /// Run until the script is exhausted and the camera has settled.
    #[instrument(skip(self), fields(inputs = self.script.len()))]
    pub async fn run(&mut self) -> Result<Summary> {
        let mut interval = time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut next_input = interval.tick().await.into_std();
        info!(tick = ?self.tick, "render loop started");

        loop {
            let now = interval.tick().await.into_std();
            self.frame(now);

            if now >= next_input {
                if let Some(input) = self.script.pop_front() {
                    self.apply(input, now);
                    next_input = now + self.input_every;
                }
            }

            if self.script.is_empty() && self.is_settled() {
                break;
            }
        }

        info!(frames = self.summary.frames, "render loop finished");
        Ok(self.summary)
    }

    fn frame(&mut self, now: Instant) {
        self.summary.frames += 1;
        for event in self.navigator.tick(now) {
            match event {
                NavigatorEvent::ResetRetried(selection) => {
                    debug!(?selection, "reset retried");
                    if !matches!(selection, Selection::Deferred) {
                        self.summary.record(selection);
                    }
                }
                other => debug!(event = ?other, "navigator"),
            }
        }

        if let Some(notice) = self.navigator.engine().notices().latest() {
            if notice.raised == now {
                warn!(message = %notice.message, "user notice");
            }
        }

        if self.log_every > 0 && self.summary.frames.is_multiple_of(self.log_every) {
            self.log_pose();
        }
    }

    fn apply(&mut self, input: Input, now: Instant) {
        let selection = match input {
            Input::Select(stage) => self.navigator.select_stage(&stage, now),
            Input::Reset => self.navigator.reset_to_overview(now),
            Input::Resize {
                width,
                height,
                device,
            } => {
                self.navigator.handle_resize(width, height, device, now);
                return;
            }
        };
        info!(?selection, "input applied");
        self.summary.record(selection);
    }

    fn is_settled(&self) -> bool {
        let engine = self.navigator.engine();
        !engine.is_transitioning()
            && !self.navigator.guard().is_busy()
            && !self.navigator.reset_pending()
    }

    fn log_pose(&self) {
        let engine = self.navigator.engine();
        let Some(rig) = engine.rig() else {
            return;
        };
        let info = engine.transition_info();
        info!(
            frame = self.summary.frames,
            phase = %info.phase,
            position = ?rig.position,
            look = ?rig.look_target,
            "camera"
        );
    }
}

/// Tab handles for every registered stage, keyed by stage.
pub fn tab_handles<'a>(stages: impl IntoIterator<Item = &'a StageId>) -> BTreeMap<StageId, String> {
    stages
        .into_iter()
        .map(|id| (id.clone(), format!("tab-{id}")))
        .collect()
}
