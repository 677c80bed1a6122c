// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud (orchestrator connection) settings.

use crate::retention::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Pod annotation recording the last TTL refresh, in epoch milliseconds.
pub const TTL_ANNOTATION: &str = "podwright.io/last-refresh";

/// Pod label carrying the agent name.
pub const AGENT_LABEL: &str = "podwright.io/agent";

pub const DEFAULT_RETENTION_TIMEOUT_MINUTES: u32 = 5;
pub const DEFAULT_DISCONNECT_TIMEOUT_SECS: u64 = 5;

/// Periodic TTL refresh settings. Absent means garbage collection is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbageCollection {
    /// How long an unrefreshed pod may live before an external collector
    /// reclaims it
    pub timeout_secs: u64,
}

/// A named orchestrator target and the defaults its agents inherit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub name: String,
    pub namespace: String,
    pub default_retention: RetentionPolicy,
    #[serde(deserialize_with = "retention_timeout")]
    pub retention_timeout_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garbage_collection: Option<GarbageCollection>,
    pub default_working_dir: String,
    pub main_container: String,
    pub disconnect_timeout_secs: u64,
    pub pod_labels: BTreeMap<String, String>,
    /// Kubeconfig context; the ambient default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            name: "kubernetes".to_string(),
            namespace: "default".to_string(),
            default_retention: RetentionPolicy::AlwaysDelete,
            retention_timeout_minutes: DEFAULT_RETENTION_TIMEOUT_MINUTES,
            garbage_collection: None,
            default_working_dir: "/home/agent".to_string(),
            main_container: "jnlp".to_string(),
            disconnect_timeout_secs: DEFAULT_DISCONNECT_TIMEOUT_SECS,
            pod_labels: BTreeMap::from([("app".to_string(), "podwright-agent".to_string())]),
            context: None,
        }
    }
}

impl CloudConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    crate::setters! {
        into {
            namespace: String,
            default_working_dir: String,
            main_container: String,
        }
        set {
            default_retention: RetentionPolicy,
            disconnect_timeout_secs: u64,
            pod_labels: BTreeMap<String, String>,
        }
        option {
            garbage_collection: GarbageCollection,
            context: String,
        }
    }

    /// Set the single-use timeout; `0` restores the default.
    pub fn retention_timeout_minutes(mut self, minutes: u32) -> Self {
        self.retention_timeout_minutes = coerce_timeout(minutes);
        self
    }

    pub fn garbage_collection_enabled(&self) -> bool {
        self.garbage_collection.is_some()
    }

    /// Bound on waiting for an agent to acknowledge a disconnect.
    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_secs(self.disconnect_timeout_secs)
    }

    /// Namespace for an agent, honouring a template override.
    pub fn namespace_for<'a>(&'a self, template_namespace: &'a str) -> &'a str {
        if template_namespace.is_empty() {
            &self.namespace
        } else {
            template_namespace
        }
    }
}

fn coerce_timeout(minutes: u32) -> u32 {
    if minutes == 0 {
        DEFAULT_RETENTION_TIMEOUT_MINUTES
    } else {
        minutes
    }
}

fn retention_timeout<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u32::deserialize(deserializer).map(coerce_timeout)
}

#[cfg(test)]
#[path = "cloud_tests.rs"]
mod tests;
