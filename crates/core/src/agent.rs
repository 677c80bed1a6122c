// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent records and their lifecycle state machine.
//!
//! A record is created when provisioning starts and is the single source of
//! truth about one agent. Only the owning controller mutates it; everyone else
//! works on clones and must tolerate an absent pod.

use crate::strategy::AgentStrategy;
use crate::template::{NodeUsageMode, Template, TemplateError, TemplateId, TemplateRegistry};
use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Generated agent name, also used as the pod name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(pub String);

impl AgentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::ops::Deref for AgentName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for AgentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of an agent.
///
/// ```text
/// Provisioning ──► Bound ──► Disconnecting ──► Terminated
///      │                       │    ▲      └─► Retained
///      └──────► Failed ◄───────┘    │
///                 └─────────────────┘ (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Provisioning,
    Bound,
    Disconnecting,
    Terminated,
    Retained,
    Failed,
}

crate::simple_display! {
    AgentStatus {
        Provisioning => "provisioning",
        Bound => "bound",
        Disconnecting => "disconnecting",
        Terminated => "terminated",
        Retained => "retained",
        Failed => "failed",
    }
}

impl AgentStatus {
    /// Terminated and Retained are final. Failed is not: it may be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Retained)
    }

    pub fn can_transition_to(&self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        matches!(
            (self, next),
            (Provisioning, Bound)
                | (Provisioning, Failed)
                | (Provisioning, Disconnecting)
                | (Bound, Disconnecting)
                | (Disconnecting, Terminated)
                | (Disconnecting, Retained)
                | (Disconnecting, Failed)
                | (Failed, Disconnecting)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("agent {agent} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub agent: AgentName,
    pub from: AgentStatus,
    pub to: AgentStatus,
}

/// Everything known about one agent.
///
/// The pod handle, the cached template, and the set of executables that have
/// already announced this agent are runtime-only and start empty after a
/// restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: AgentName,
    pub cloud: String,
    pub template_id: TemplateId,
    pub namespace: String,
    /// Usage label, defaulted from the template
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub usage_mode: NodeUsageMode,
    pub strategy: AgentStrategy,
    pub status: AgentStatus,
    pub created_at_ms: u64,
    pub last_active_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh_ms: Option<u64>,
    #[serde(default)]
    pub busy: bool,
    #[serde(default = "accepting_default")]
    pub accepting_tasks: bool,
    #[serde(skip)]
    pod: Option<Pod>,
    #[serde(skip)]
    working_dir: Option<String>,
    #[serde(skip)]
    template: Option<Arc<Template>>,
    #[serde(skip)]
    executables: HashSet<String>,
}

fn accepting_default() -> bool {
    true
}

impl AgentRecord {
    pub fn new(
        name: AgentName,
        cloud: impl Into<String>,
        template: &Template,
        namespace: impl Into<String>,
        strategy: AgentStrategy,
        now_ms: u64,
    ) -> Self {
        Self {
            name,
            cloud: cloud.into(),
            template_id: template.id.clone(),
            namespace: namespace.into(),
            label: template.label.clone(),
            usage_mode: template.usage_mode(),
            strategy,
            status: AgentStatus::Provisioning,
            created_at_ms: now_ms,
            last_active_ms: now_ms,
            last_refresh_ms: None,
            busy: false,
            accepting_tasks: true,
            pod: None,
            working_dir: None,
            template: Some(Arc::new(template.clone())),
            executables: HashSet::new(),
        }
    }

    pub fn transition(&mut self, next: AgentStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition { agent: self.name.clone(), from: self.status, to: next });
        }
        self.status = next;
        Ok(())
    }

    /// Attach the created pod and mark the agent bound.
    ///
    /// The working directory is read from the container named
    /// `main_container`; `default_working_dir` applies when that container is
    /// missing or declares none.
    pub fn assign_pod(
        &mut self,
        pod: Pod,
        main_container: &str,
        default_working_dir: &str,
    ) -> Result<(), InvalidTransition> {
        self.transition(AgentStatus::Bound)?;
        let working_dir = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.containers.iter().find(|c| c.name == main_container))
            .and_then(|c| c.working_dir.clone())
            .filter(|wd| !wd.trim().is_empty())
            .unwrap_or_else(|| default_working_dir.to_string());
        self.working_dir = Some(working_dir);
        self.pod = Some(pod);
        Ok(())
    }

    pub fn clear_pod(&mut self) {
        self.pod = None;
    }

    pub fn pod(&self) -> Option<&Pod> {
        self.pod.as_ref()
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.working_dir.as_deref()
    }

    /// `namespace/name`
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// The effective template this agent was provisioned from.
    ///
    /// Resolved from `registry` on first use and cached afterwards.
    pub fn template(&mut self, registry: &TemplateRegistry) -> Result<Arc<Template>, TemplateError> {
        if let Some(template) = &self.template {
            return Ok(Arc::clone(template));
        }
        let template = registry
            .resolve(&self.template_id)
            .map(Arc::new)
            .map_err(|_| TemplateError::Unresolvable(self.template_id.clone()))?;
        self.template = Some(Arc::clone(&template));
        Ok(template)
    }

    pub fn cached_template(&self) -> Option<&Arc<Template>> {
        self.template.as_ref()
    }

    /// Record that `executable` has announced this agent.
    ///
    /// Returns true only the first time a given executable is seen.
    pub fn bind_executable(&mut self, executable: impl Into<String>) -> bool {
        self.executables.insert(executable.into())
    }

    pub fn executables(&self) -> &HashSet<String> {
        &self.executables
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
