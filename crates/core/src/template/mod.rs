// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent templates.
//!
//! A template is a *fragment*: any field may be left unset so that it can be
//! inherited from the templates named in `inherit_from`. Only the output of
//! [`TemplateRegistry::resolve`] describes a pod that can be created.
//!
//! # Module layout
//!
//! - [`resolve`]: field-by-field merge of a parent/child pair and of chains
//! - [`registry`]: id-keyed template storage and inheritance chain building

mod id;
mod registry;
mod resolve;

pub use id::TemplateId;
pub use registry::TemplateRegistry;
pub use resolve::{combine, resolve_chain};

use crate::retention::RetentionPolicy;
use crate::strategy::AgentStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from template lookup and resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(TemplateId),
    #[error("unable to resolve template from id={0}")]
    Unresolvable(TemplateId),
    #[error("template inheritance visits {0} twice")]
    InheritanceCycle(TemplateId),
}

/// How eagerly the scheduler may place work on agents of this template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeUsageMode {
    /// Use the agent as much as possible
    #[default]
    Normal,
    /// Only build jobs whose label expression matches
    Exclusive,
}

crate::simple_display! {
    NodeUsageMode {
        Normal => "normal",
        Exclusive => "exclusive",
    }
}

/// One container of an agent pod. `name` is the merge key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSpec {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self { name: name.into(), image: image.into(), ..Default::default() }
    }
}

/// Type-specific payload of a pod volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeSource {
    EmptyDir {
        #[serde(default)]
        memory: bool,
    },
    PersistentClaim {
        claim_name: String,
        #[serde(default)]
        read_only: bool,
    },
    HostPath {
        host_path: String,
    },
    ConfigMap {
        name: String,
    },
    Secret {
        secret_name: String,
    },
}

/// A volume mounted into every container of the pod. `mount_path` is the
/// merge key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub mount_path: String,
    #[serde(flatten)]
    pub source: VolumeSource,
}

impl VolumeSpec {
    pub fn empty_dir(mount_path: impl Into<String>) -> Self {
        Self { mount_path: mount_path.into(), source: VolumeSource::EmptyDir { memory: false } }
    }
}

/// A template fragment.
///
/// String and list fields are unset when empty, `Option` fields when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub id: TemplateId,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Whitespace-separated usage labels
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_usage_mode: Option<NodeUsageMode>,
    /// Namespace override; the cloud's namespace applies when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(rename = "container", skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerSpec>,
    #[serde(rename = "volume", skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionPolicy>,
    /// Print the pod manifest into the build log when an agent is first used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_raw_yaml: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Parent templates, most generic first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inherit_from: Vec<TemplateId>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: TemplateId::generate(),
            name: String::new(),
            label: String::new(),
            node_usage_mode: None,
            namespace: String::new(),
            containers: Vec::new(),
            volumes: Vec::new(),
            idle_minutes: None,
            retention: None,
            show_raw_yaml: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            inherit_from: Vec::new(),
        }
    }
}

impl Template {
    pub fn new(id: impl Into<TemplateId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), ..Default::default() }
    }

    crate::setters! {
        into {
            label: String,
            namespace: String,
        }
        set {
            containers: Vec<ContainerSpec>,
            volumes: Vec<VolumeSpec>,
            inherit_from: Vec<TemplateId>,
        }
        option {
            node_usage_mode: NodeUsageMode,
            idle_minutes: u32,
            retention: RetentionPolicy,
            show_raw_yaml: bool,
        }
    }

    /// Container with the given name, if declared.
    pub fn container(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn usage_mode(&self) -> NodeUsageMode {
        self.node_usage_mode.unwrap_or_default()
    }

    pub fn idle_timeout_minutes(&self) -> u32 {
        self.idle_minutes.unwrap_or(0)
    }

    pub fn wants_raw_yaml(&self) -> bool {
        self.show_raw_yaml.unwrap_or(false)
    }

    /// Agent reuse strategy derived from the idle timeout.
    pub fn strategy(&self, retention_timeout_minutes: u32) -> AgentStrategy {
        AgentStrategy::for_idle_minutes(self.idle_timeout_minutes(), retention_timeout_minutes)
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod resolve_tests;
