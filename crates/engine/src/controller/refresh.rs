// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TTL refresh.
//!
//! An external collector reclaims pods whose refresh annotation is older
//! than the cloud's garbage collection timeout. Refreshing is driven by an
//! outside scheduler and never terminates an agent.

use super::LifecycleController;
use pw_adapters::OrchestratorError;
use pw_core::{AgentName, Clock, TTL_ANNOTATION};

/// How a refresh request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The annotation now holds `at_ms`
    Refreshed { at_ms: u64 },
    /// The cloud has garbage collection turned off
    Disabled,
    /// The pod no longer exists
    PodGone,
    /// Nothing was patched
    Skipped { reason: String },
}

impl<C: Clock> LifecycleController<C> {
    /// Stamp agent `name`'s pod with the current time.
    ///
    /// Failures are reported to the agent's listener and never terminate it.
    pub async fn refresh_ttl(&self, name: &AgentName) -> RefreshOutcome {
        let listener = self.listener_for(name);
        let Some(record) = self.record(name) else {
            return skipped(name, format!("unknown agent {}", name));
        };
        if record.status.is_terminal() {
            return skipped(name, format!("agent is {}", record.status));
        }
        let Some(cloud) = self.cloud(&record.cloud) else {
            let reason = format!("cloud {} not found", record.cloud);
            listener.error(&format!(
                "Failed to annotate agent pod {} with TTL: {}",
                record.qualified_name(),
                reason
            ));
            return skipped(name, reason);
        };
        if !cloud.config.garbage_collection_enabled() {
            return RefreshOutcome::Disabled;
        }

        let client = match self.orchestrator.connect(&cloud.config).await {
            Ok(client) => client,
            Err(e) => {
                let line = match e {
                    OrchestratorError::Auth(_) => "Failed to authenticate to Kubernetes cluster",
                    _ => "Failed to connect to Kubernetes cluster",
                };
                listener.error(&format!("{}: {}", line, e));
                return skipped(name, format!("connect failed: {}", e));
            }
        };

        let now = self.clock.epoch_ms();
        let patched = client
            .patch_annotation(&record.namespace, name, TTL_ANNOTATION, &now.to_string())
            .await;
        match patched {
            Ok(()) => {
                if let Err(e) = self.update(name, |r| r.last_refresh_ms = Some(now)) {
                    tracing::warn!(agent = %name, error = %e, "refreshed pod of a vanished record");
                }
                tracing::debug!(agent = %name, at_ms = now, "refreshed pod TTL");
                listener.info(&format!("Annotated agent pod {} with TTL", record.qualified_name()));
                RefreshOutcome::Refreshed { at_ms: now }
            }
            Err(OrchestratorError::NotFound(_)) => {
                tracing::debug!(agent = %name, "pod gone, nothing to refresh");
                RefreshOutcome::PodGone
            }
            Err(e) => {
                tracing::warn!(agent = %name, error = %e, "RefreshFailure");
                listener.error(&format!(
                    "Failed to annotate agent pod {} with TTL: {}",
                    record.qualified_name(),
                    e
                ));
                RefreshOutcome::Skipped { reason: e.to_string() }
            }
        }
    }
}

fn skipped(name: &AgentName, reason: String) -> RefreshOutcome {
    tracing::warn!(agent = %name, %reason, "skipping TTL refresh");
    RefreshOutcome::Skipped { reason }
}
