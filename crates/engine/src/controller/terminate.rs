// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention-aware agent termination.
//!
//! Termination never returns an error: every failure is reported to the
//! agent's listener, logged, and folded into a [`TerminationOutcome`].

use super::LifecycleController;
use crate::listener::TaskListener;
use pw_adapters::{Instruction, PodClient, TransportError};
use pw_core::{AgentName, AgentStatus, Clock, RetentionPolicy};
use std::fmt;
use std::sync::Arc;

/// How a termination request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The pod was deleted
    Deleted,
    /// The pod no longer existed; the agent is terminated anyway
    AlreadyGone,
    /// The retention policy kept the pod
    Retained { policy: RetentionPolicy },
    /// Nothing to do: the agent is already terminal or being terminated
    Unchanged(AgentStatus),
    /// The agent is left `Failed` (or was never known)
    Failed { reason: String },
}

impl TerminationOutcome {
    /// The pod is gone or intentionally kept.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted | Self::AlreadyGone | Self::Retained { .. })
    }
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::AlreadyGone => f.write_str("already gone"),
            Self::Retained { policy } => write!(f, "retained ({})", policy),
            Self::Unchanged(status) => write!(f, "unchanged ({})", status),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

impl<C: Clock> LifecycleController<C> {
    /// Terminate agent `name`, deleting or retaining its pod.
    pub async fn terminate(&self, name: &AgentName) -> TerminationOutcome {
        let Some(entry) = self.entry(name) else {
            tracing::warn!(agent = %name, "terminate requested for unknown agent");
            return TerminationOutcome::Failed { reason: format!("unknown agent {}", name) };
        };
        let listener = self.listener_for(name);

        // Claim the record and copy what the remote calls need.
        let (cloud_name, namespace, template_id, cached_policy) = {
            let mut record = entry.lock();
            if record.status.is_terminal() || record.status == AgentStatus::Disconnecting {
                tracing::debug!(agent = %name, status = %record.status, "nothing to terminate");
                return TerminationOutcome::Unchanged(record.status);
            }
            if let Err(e) = record.transition(AgentStatus::Disconnecting) {
                return TerminationOutcome::Failed { reason: e.to_string() };
            }
            self.persist(&record);
            let cached_policy = record.cached_template().map(|t| t.retention.clone());
            (record.cloud.clone(), record.namespace.clone(), record.template_id.clone(), cached_policy)
        };
        listener.info(&format!("Terminating Kubernetes instance for agent {}", name));

        let Some(cloud) = self.cloud(&cloud_name) else {
            let line = format!(
                "Unable to terminate agent {}. Cloud {} may have been removed. \
                 There may be leftover resources on the Kubernetes cluster.",
                name, cloud_name
            );
            tracing::error!(agent = %name, cloud = %cloud_name, "cloud not found, cannot terminate");
            listener.fatal(&line);
            return self.fail(name, line);
        };

        let client = match self.orchestrator.connect(&cloud.config).await {
            Ok(client) => client,
            Err(e) => {
                let line = format!(
                    "Failed to connect to cloud {}. There may be leftover resources on the \
                     Kubernetes cluster: {}",
                    cloud_name, e
                );
                tracing::error!(agent = %name, cloud = %cloud_name, error = %e, "connect failed");
                listener.fatal(&line);
                return self.fail(name, line);
            }
        };

        let template_policy = match cached_policy {
            Some(policy) => policy,
            None => {
                let resolved = entry.lock().template(&cloud.templates);
                match resolved {
                    Ok(template) => template.retention.clone(),
                    Err(e) => {
                        tracing::warn!(agent = %name, template = %template_id, error = %e, "using cloud retention");
                        None
                    }
                }
            }
        };
        let policy = RetentionPolicy::effective(template_policy.as_ref(), &cloud.config);
        let now = self.clock.epoch_ms();
        let delete = policy
            .should_delete(&cloud.config, now, || fetch_pod(Arc::clone(&client), &namespace, name))
            .await;

        self.disconnect(name, cloud.config.disconnect_timeout()).await;

        if !delete {
            tracing::warn!(agent = %name, %namespace, %policy, "pod not deleted due to retention policy");
            listener.info(&format!(
                "Pod {}/{} was not deleted due to retention policy {}",
                namespace, name, policy
            ));
            let outcome = TerminationOutcome::Retained { policy };
            return self.finish(name, AgentStatus::Retained, outcome, listener.as_ref());
        }

        match client.delete_pod(&namespace, name).await {
            Ok(0) => {
                tracing::warn!(agent = %name, %namespace, "pod already gone");
                listener.info(&format!("Pod {}/{} was already deleted", namespace, name));
                self.finish(name, AgentStatus::Terminated, TerminationOutcome::AlreadyGone, listener.as_ref())
            }
            Ok(1) => {
                tracing::info!(agent = %name, %namespace, "terminated pod");
                listener.info(&format!("Terminated Kubernetes instance for agent {}/{}", namespace, name));
                self.finish(name, AgentStatus::Terminated, TerminationOutcome::Deleted, listener.as_ref())
            }
            Ok(count) => {
                let line = format!(
                    "Expected to delete 1 pod for agent {}/{} but {} were deleted",
                    namespace, name, count
                );
                tracing::error!(agent = %name, %namespace, count, "unexpected pod delete count");
                listener.error(&line);
                self.fail(name, line)
            }
            Err(e) => {
                let line = format!("Failed to terminate pod for agent {}/{}: {}", namespace, name, e);
                tracing::error!(agent = %name, %namespace, error = %e, "failed to delete pod");
                listener.error(&line);
                self.fail(name, line)
            }
        }
    }

    /// Ask a connected agent to stop reconnecting, bounded by `timeout`.
    async fn disconnect(&self, name: &AgentName, timeout: std::time::Duration) {
        let channel = self.channels.lock().get(name).cloned();
        let Some(channel) = channel else {
            return;
        };
        let sent = tokio::time::timeout(timeout, channel.send(Instruction::StopReconnecting))
            .await
            .unwrap_or(Err(TransportError::Timeout));
        match sent {
            Ok(()) => tracing::debug!(agent = %name, "agent told to stop reconnecting"),
            Err(e) => tracing::info!(agent = %name, ?timeout, error = %e, "ignoring error sending stop-reconnecting"),
        }
    }

    fn finish(
        &self,
        name: &AgentName,
        status: AgentStatus,
        outcome: TerminationOutcome,
        listener: &dyn TaskListener,
    ) -> TerminationOutcome {
        self.detach_channel(name);
        let applied = self.update(name, |record| {
            record.clear_pod();
            record.transition(status)
        });
        match applied {
            Ok(Ok(())) => {
                listener.info(&format!("Disconnected agent {}", name));
                outcome
            }
            Ok(Err(e)) => TerminationOutcome::Failed { reason: e.to_string() },
            Err(e) => TerminationOutcome::Failed { reason: e.to_string() },
        }
    }

    fn fail(&self, name: &AgentName, reason: String) -> TerminationOutcome {
        if let Err(e) = self.update(name, |record| record.transition(AgentStatus::Failed)) {
            tracing::warn!(agent = %name, error = %e, "failed to record termination failure");
        }
        TerminationOutcome::Failed { reason }
    }
}

async fn fetch_pod(
    client: Arc<dyn PodClient>,
    namespace: &str,
    name: &str,
) -> Option<k8s_openapi::api::core::v1::Pod> {
    match client.get_pod(namespace, name).await {
        Ok(pod) => pod,
        Err(e) => {
            tracing::warn!(agent = %name, %namespace, error = %e, "failed to fetch pod, treating as absent");
            None
        }
    }
}
