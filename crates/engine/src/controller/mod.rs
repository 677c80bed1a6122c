// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle controller.
//!
//! # Module layout
//!
//! - [`provision`]: provisioning, reuse, task accounting, launch announcements
//! - [`terminate`]: retention-aware pod teardown
//! - [`refresh`]: TTL annotation refresh
//!
//! # Locking
//!
//! The agent map lock is held only to look up or insert a record. Each record
//! has its own lock, which is never held across an `.await`: operations copy
//! what they need, release the lock for remote calls, then re-lock to apply
//! the result.

mod provision;
mod refresh;
mod terminate;

pub use refresh::RefreshOutcome;
pub use terminate::TerminationOutcome;

use crate::error::EngineError;
use crate::listener::{NullListener, TaskListener};
use parking_lot::{Mutex, RwLock};
use pw_adapters::{AgentChannel, Orchestrator};
use pw_core::{AgentName, AgentRecord, AgentStatus, Clock, CloudConfig, TemplateRegistry};
use pw_storage::RecordStore;
use std::collections::HashMap;
use std::sync::Arc;

/// A cloud and the templates its agents may be provisioned from.
pub struct Cloud {
    pub config: CloudConfig,
    pub templates: Arc<TemplateRegistry>,
}

impl Cloud {
    pub fn new(config: CloudConfig, templates: TemplateRegistry) -> Self {
        Self { config, templates: Arc::new(templates) }
    }
}

pub struct LifecycleController<C: Clock> {
    clouds: RwLock<HashMap<String, Arc<Cloud>>>,
    agents: Mutex<HashMap<AgentName, Arc<Mutex<AgentRecord>>>>,
    channels: Mutex<HashMap<AgentName, Arc<dyn AgentChannel>>>,
    listeners: Mutex<HashMap<AgentName, Arc<dyn TaskListener>>>,
    orchestrator: Arc<dyn Orchestrator>,
    store: Arc<dyn RecordStore>,
    clock: C,
}

impl<C: Clock> LifecycleController<C> {
    pub fn new(orchestrator: Arc<dyn Orchestrator>, store: Arc<dyn RecordStore>, clock: C) -> Self {
        Self {
            clouds: RwLock::new(HashMap::new()),
            agents: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
            listeners: Mutex::new(HashMap::new()),
            orchestrator,
            store,
            clock,
        }
    }

    /// Register a cloud, replacing any cloud with the same name.
    pub fn add_cloud(&self, cloud: Cloud) {
        self.clouds.write().insert(cloud.config.name.clone(), Arc::new(cloud));
    }

    pub fn remove_cloud(&self, name: &str) -> Option<Arc<Cloud>> {
        self.clouds.write().remove(name)
    }

    pub fn cloud(&self, name: &str) -> Option<Arc<Cloud>> {
        self.clouds.read().get(name).cloned()
    }

    /// Attach the control channel of a connected agent.
    pub fn attach_channel(&self, name: &AgentName, channel: Arc<dyn AgentChannel>) {
        self.channels.lock().insert(name.clone(), channel);
    }

    /// Forget the control channel of an agent that went away on its own.
    pub fn detach_channel(&self, name: &AgentName) {
        self.channels.lock().remove(name);
    }

    /// Attach the listener of the run an agent is serving.
    pub fn attach_listener(&self, name: &AgentName, listener: Arc<dyn TaskListener>) {
        self.listeners.lock().insert(name.clone(), listener);
    }

    /// Listener attached to `name`, or one that discards output.
    pub fn listener_for(&self, name: &AgentName) -> Arc<dyn TaskListener> {
        self.listeners.lock().get(name).cloned().unwrap_or_else(|| Arc::new(NullListener))
    }

    /// A copy of one record.
    pub fn record(&self, name: &AgentName) -> Option<AgentRecord> {
        self.entry(name).map(|r| r.lock().clone())
    }

    /// Copies of every record, sorted by name.
    pub fn snapshot(&self) -> Vec<AgentRecord> {
        let entries: Vec<_> = self.agents.lock().values().cloned().collect();
        let mut records: Vec<_> = entries.iter().map(|r| r.lock().clone()).collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Re-insert persisted records after a restart.
    ///
    /// Restored records have no pod handle and no bound executables; their
    /// template is re-resolved on first use. Names already known are skipped.
    /// A record saved mid-termination comes back `Failed`, since whatever was
    /// tearing it down is gone, so the next terminate retries it.
    /// Returns the number of records inserted.
    pub fn restore(&self, records: impl IntoIterator<Item = AgentRecord>) -> usize {
        let mut agents = self.agents.lock();
        let mut restored = 0;
        for mut record in records {
            if agents.contains_key(&record.name) {
                tracing::debug!(agent = %record.name, "skipping restore of known agent");
                continue;
            }
            if record.status == AgentStatus::Disconnecting {
                match record.transition(AgentStatus::Failed) {
                    Ok(()) => {
                        tracing::warn!(agent = %record.name, "termination was interrupted, marking agent failed");
                        self.persist(&record);
                    }
                    Err(e) => tracing::warn!(agent = %record.name, error = %e, "cannot demote interrupted agent"),
                }
            }
            agents.insert(record.name.clone(), Arc::new(Mutex::new(record)));
            restored += 1;
        }
        restored
    }

    /// [`restore`](Self::restore) everything in the record store.
    pub fn restore_from_store(&self) -> Result<usize, EngineError> {
        let records = self.store.load_all()?;
        let restored = self.restore(records);
        tracing::info!(restored, "restored agent records");
        Ok(restored)
    }

    fn entry(&self, name: &AgentName) -> Option<Arc<Mutex<AgentRecord>>> {
        self.agents.lock().get(name).cloned()
    }

    fn require(&self, name: &AgentName) -> Result<Arc<Mutex<AgentRecord>>, EngineError> {
        self.entry(name).ok_or_else(|| EngineError::UnknownAgent(name.clone()))
    }

    /// Apply `f` to a record under its lock and persist the result.
    fn update<R>(
        &self,
        name: &AgentName,
        f: impl FnOnce(&mut AgentRecord) -> R,
    ) -> Result<R, EngineError> {
        let entry = self.require(name)?;
        let mut record = entry.lock();
        let result = f(&mut record);
        self.persist(&record);
        Ok(result)
    }

    /// Save a live record or forget a terminal one. Store failures are logged.
    fn persist(&self, record: &AgentRecord) {
        let result = if record.status.is_terminal() {
            self.store.remove(&record.name)
        } else {
            self.store.save(record)
        };
        if let Err(e) = result {
            tracing::warn!(agent = %record.name, error = %e, "failed to persist agent record");
        }
    }
}

#[cfg(test)]
#[path = "../controller_tests/mod.rs"]
mod tests;
