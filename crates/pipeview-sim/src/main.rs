// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pipeview simulation driver.
//!
//! Loads camera settings, builds the engine and navigator, then replays a
//! scripted sequence of stage clicks against a fixed-interval render loop,
//! logging camera poses and navigator events.

mod driver;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use driver::{tab_handles, Driver, Input, LogFeedback};
use pipeview_app_core::config::ConfigService;
use pipeview_camera::{
    CameraSettings, CameraTransitionEngine, DeviceClass, StageNavigator, TweenTimeline,
};
use pipeview_config_fs::FsConfigStore;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Device {
    Mobile,
    Tablet,
    Desktop,
}

impl From<Device> for DeviceClass {
    fn from(d: Device) -> Self {
        match d {
            Device::Mobile => Self::Mobile,
            Device::Tablet => Self::Tablet,
            Device::Desktop => Self::Desktop,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `camera.json` (defaults to the platform config dir)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Write the effective settings back to the config store
    #[arg(long)]
    write_defaults: bool,

    /// Starting device class
    #[arg(long, value_enum, default_value_t = Device::Desktop)]
    device: Device,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1440)]
    width: u16,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 900)]
    height: u16,

    /// Milliseconds between render ticks
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Milliseconds between scripted inputs
    #[arg(long, default_value_t = 1500)]
    input_every_ms: u64,

    /// Log the camera pose every N frames (0 disables)
    #[arg(long, default_value_t = 30)]
    log_every: u64,

    /// Comma-separated inputs: stage ids, `reset`, `@mobile`, `@tablet`, `@desktop`
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "leadGen,retention,reset,delivery,@mobile,qualification,overview"
    )]
    script: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let settings = load_settings(&args)?;
    let device = DeviceClass::from(args.device);
    let handles = tab_handles(settings.viewpoints.stages());

    let mut engine = CameraTransitionEngine::new(settings, device, TweenTimeline::default())
        .map_err(|e| {
            error!(error = %e, notice = e.user_message(), "engine rejected settings");
            e
        })?;
    engine.init_camera(f32::from(args.width) / f32::from(args.height.max(1)));

    let navigator = StageNavigator::new(engine, LogFeedback, handles);
    let script = args.script.iter().map(|w| Input::parse(w.trim()));
    let mut driver = Driver::new(
        navigator,
        Duration::from_millis(args.tick_ms.max(1)),
        Duration::from_millis(args.input_every_ms),
        script,
    )
    .log_every(args.log_every);

    let summary = driver.run().await?;
    info!(
        frames = summary.frames,
        started = summary.started,
        throttled = summary.throttled,
        deferred = summary.deferred,
        failed = summary.failed,
        "simulation complete"
    );
    Ok(())
}

fn load_settings(args: &Args) -> Result<CameraSettings> {
    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
    .context("opening config store")?;
    info!(dir = %store.base().display(), "config store");
    let service = ConfigService::new(store);

    let settings = CameraSettings::load(&service).map_err(|e| {
        error!(error = %e, notice = e.user_message(), "camera settings unusable");
        e
    })?;

    if args.write_defaults {
        service
            .save(CameraSettings::CONFIG_KEY, &settings)
            .context("writing camera settings")?;
        info!(key = CameraSettings::CONFIG_KEY, "camera settings written");
    }
    Ok(settings)
}
