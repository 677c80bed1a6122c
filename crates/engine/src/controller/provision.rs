// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning, reuse, and task accounting.

use super::LifecycleController;
use crate::error::EngineError;
use crate::listener::TaskListener;
use parking_lot::Mutex;
use pw_adapters::{build_pod, OrchestratorError};
use pw_core::{generate_name, AgentName, AgentRecord, AgentStatus, Clock, TemplateId};
use std::sync::Arc;

const NAME_ATTEMPTS: usize = 8;

impl<C: Clock> LifecycleController<C> {
    /// Provision a new agent from `template_id` of `cloud`.
    ///
    /// Template resolution failures are returned before any record exists.
    /// Once the record is created, a remote failure leaves it `Failed` and
    /// is returned as well.
    pub async fn provision(
        &self,
        cloud: &str,
        template_id: &TemplateId,
    ) -> Result<AgentRecord, EngineError> {
        let cloud = self.cloud(cloud).ok_or_else(|| EngineError::UnknownCloud(cloud.to_string()))?;
        let template = cloud.templates.resolve(template_id)?;
        let config = &cloud.config;
        let namespace = config.namespace_for(&template.namespace).to_string();
        let strategy = template.strategy(config.retention_timeout_minutes);

        let now = self.clock.epoch_ms();
        let (name, entry) = {
            let mut agents = self.agents.lock();
            let mut name = AgentName::new(generate_name(&template.name));
            for _ in 1..NAME_ATTEMPTS {
                if !agents.contains_key(&name) {
                    break;
                }
                name = AgentName::new(generate_name(&template.name));
            }
            let record =
                AgentRecord::new(name.clone(), &config.name, &template, &namespace, strategy, now);
            let entry = Arc::new(Mutex::new(record));
            agents.insert(name.clone(), Arc::clone(&entry));
            (name, entry)
        };
        self.persist(&entry.lock());
        tracing::info!(agent = %name, template = %template_id, %namespace, %strategy, "provisioning agent");

        let pod = build_pod(&template, config, &name, &namespace);
        let client = match self.orchestrator.connect(config).await {
            Ok(client) => client,
            Err(e) => return Err(self.provision_failed(&entry, &name, e)),
        };
        let pod = match client.create_pod(&namespace, &pod).await {
            Ok(pod) => pod,
            Err(e) => return Err(self.provision_failed(&entry, &name, e)),
        };

        // A terminate may have claimed the record while the pod was being created.
        let bound = {
            let mut record = entry.lock();
            if record.status == AgentStatus::Provisioning {
                record.assign_pod(pod, &config.main_container, &config.default_working_dir)?;
                self.persist(&record);
                Ok(record.clone())
            } else {
                Err(record.status)
            }
        };
        match bound {
            Ok(record) => {
                tracing::info!(agent = %name, "agent bound");
                Ok(record)
            }
            Err(status) => {
                tracing::warn!(agent = %name, %namespace, %status, "agent left provisioning, deleting its new pod");
                if let Err(e) = client.delete_pod(&namespace, &name).await {
                    tracing::error!(agent = %name, %namespace, error = %e, "failed to delete pod of abandoned agent");
                }
                Err(EngineError::Abandoned { agent: name, status })
            }
        }
    }

    /// Record a failed pod creation, unless a terminate already took over.
    fn provision_failed(
        &self,
        entry: &Mutex<AgentRecord>,
        name: &AgentName,
        error: OrchestratorError,
    ) -> EngineError {
        tracing::error!(agent = %name, error = %error, "failed to create pod");
        let mut record = entry.lock();
        if record.status == AgentStatus::Provisioning {
            if let Err(e) = record.transition(AgentStatus::Failed) {
                return e.into();
            }
            self.persist(&record);
        }
        error.into()
    }

    /// An agent ready to take a task from `template_id`.
    ///
    /// Reuses a bound, idle agent of the same template whose strategy allows
    /// reuse and whose idle window is still open; otherwise provisions one.
    pub async fn acquire(
        &self,
        cloud: &str,
        template_id: &TemplateId,
    ) -> Result<AgentRecord, EngineError> {
        let now = self.clock.epoch_ms();
        let entries: Vec<_> = self.agents.lock().values().cloned().collect();
        let reusable = entries
            .iter()
            .map(|entry| entry.lock().clone())
            .filter(|r| {
                r.cloud == cloud
                    && &r.template_id == template_id
                    && r.status == AgentStatus::Bound
                    && !r.busy
                    && r.accepting_tasks
                    && r.strategy.is_reusable()
                    && r.strategy.within_window(r.last_active_ms, now)
            })
            .min_by(|a, b| a.name.cmp(&b.name));

        match reusable {
            Some(record) => {
                tracing::info!(agent = %record.name, template = %template_id, "reusing idle agent");
                Ok(record)
            }
            None => self.provision(cloud, template_id).await,
        }
    }

    /// Mark an agent busy. Single-use agents stop accepting further tasks.
    pub fn task_started(&self, name: &AgentName) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        self.update(name, |record| {
            record.busy = true;
            record.last_active_ms = now;
            if !record.strategy.is_reusable() {
                record.accepting_tasks = false;
            }
        })
    }

    pub fn task_finished(&self, name: &AgentName) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        self.update(name, |record| {
            record.busy = false;
            record.last_active_ms = now;
        })
    }

    /// Bound agents whose strategy says they should be terminated now.
    pub fn expired_agents(&self) -> Vec<AgentName> {
        let now = self.clock.epoch_ms();
        self
            .snapshot()
            .into_iter()
            .filter(|r| {
                r.status == AgentStatus::Bound
                    && r.strategy.is_expired(r.busy, r.accepting_tasks, r.last_active_ms, now)
            })
            .map(|r| r.name)
            .collect()
    }

    /// Announce to a run that it is using agent `name`.
    ///
    /// Only the first announcement per executable prints anything. Returns
    /// whether this was that first announcement.
    pub fn announce_launch(
        &self,
        name: &AgentName,
        executable: &str,
        listener: &dyn TaskListener,
    ) -> Result<bool, EngineError> {
        let entry = self.require(name)?;
        let mut record = entry.lock();
        if !record.bind_executable(executable) {
            return Ok(false);
        }

        let cached = record.cached_template().cloned();
        let template = match cached {
            Some(template) => template,
            None => {
                let cloud = self
                    .cloud(&record.cloud)
                    .ok_or_else(|| EngineError::UnknownCloud(record.cloud.clone()))?;
                match record.template(&cloud.templates) {
                    Ok(template) => template,
                    Err(e) => {
                        listener.error(&format!("Agent {} has no resolvable template: {}", name, e));
                        return Err(e.into());
                    }
                }
            }
        };

        let template_name =
            if template.name.is_empty() { template.id.as_str() } else { template.name.as_str() };
        listener.info(&format!(
            "Agent {} is provisioned from template {}",
            name, template_name
        ));
        if template.wants_raw_yaml() {
            if let Some(pod) = record.pod() {
                match serde_json::to_string_pretty(pod) {
                    Ok(manifest) => listener.info(&manifest),
                    Err(e) => tracing::warn!(agent = %name, error = %e, "failed to render pod manifest"),
                }
            }
        }
        Ok(true)
    }
}
