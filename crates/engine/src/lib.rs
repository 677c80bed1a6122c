// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-engine: build agent lifecycle controller
//!
//! The controller owns every agent record, drives provisioning and
//! termination against an [`Orchestrator`](pw_adapters::Orchestrator), and
//! reports operator-facing progress to per-agent [`TaskListener`]s.

mod controller;
mod error;
mod listener;

pub use controller::{Cloud, LifecycleController, RefreshOutcome, TerminationOutcome};
pub use error::EngineError;
pub use listener::{NullListener, TaskListener};

#[cfg(any(test, feature = "test-support"))]
pub use listener::BufferListener;
