// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-core: data model and pure algorithms for podwright build agents
//!
//! Everything here is synchronous and free of I/O: template composition,
//! agent naming, retention decisions, and the agent record state machine.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod cloud;
pub mod config;
pub mod name;
pub mod retention;
pub mod strategy;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentName, AgentRecord, AgentStatus, InvalidTransition};
pub use clock::{Clock, FakeClock, SystemClock};
pub use cloud::{CloudConfig, GarbageCollection, AGENT_LABEL, TTL_ANNOTATION};
pub use config::{CloudSpec, Config, ConfigError};
pub use name::{generate_name, is_legal_name, DEFAULT_PREFIX, MAX_NAME_LEN};
pub use retention::{last_activity_ms, pod_failed, RetentionPolicy};
pub use strategy::AgentStrategy;
pub use template::{
    combine, resolve_chain, ContainerSpec, NodeUsageMode, Template, TemplateError, TemplateId,
    TemplateRegistry, VolumeSource, VolumeSpec,
};
