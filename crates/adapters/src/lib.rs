// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-adapters: orchestrator and agent transport seams
//!
//! # Module layout
//!
//! - [`orchestrator`]: `Orchestrator` / `PodClient` traits and their errors
//! - [`k8s`]: kube-rs implementation against a real cluster
//! - [`pod`]: effective template to `Pod` manifest
//! - [`channel`]: instructions sent to a connected agent

pub mod channel;
pub mod k8s;
pub mod orchestrator;
pub mod pod;

pub use channel::{AgentChannel, Instruction, MpscChannel, TransportError};
pub use k8s::KubeOrchestrator;
pub use orchestrator::{Orchestrator, OrchestratorError, PodClient};
pub use pod::build_pod;

#[cfg(any(test, feature = "test-support"))]
pub use channel::FakeChannel;
#[cfg(any(test, feature = "test-support"))]
pub use orchestrator::{FakeOrchestrator, PodCall};
