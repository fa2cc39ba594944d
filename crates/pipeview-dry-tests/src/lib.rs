// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Pipeview crates.
#![forbid(unsafe_code)]
//!
//! - [`config`]: in-memory config store fake with failure injection
//! - [`clock`]: manual frame clock for driving tick-based code deterministically

pub mod clock;
pub mod config;

pub use clock::FrameClock;
pub use config::InMemoryConfigStore;
