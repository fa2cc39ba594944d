// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Pipeview tools.
//!
//! - [`config`]: storage port for raw config blobs plus a JSON service on top.
//! - [`notice`]: user-facing notice queue (TTL + dedupe) for non-technical
//!   error messages.
//!
//! Nothing here knows about cameras or rendering; adapters stay thin.

pub mod config;
pub mod notice;
