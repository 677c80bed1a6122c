// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container orchestrator seam.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use pw_core::CloudConfig;
use std::sync::Arc;
use thiserror::Error;

/// Errors from orchestrator operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("api error: {0}")]
    Api(String),
}

/// Entry point to an orchestrator: turns cloud settings into a client.
#[async_trait]
pub trait Orchestrator: Send + Sync + 'static {
    async fn connect(&self, cloud: &CloudConfig) -> Result<Arc<dyn PodClient>, OrchestratorError>;
}

/// Pod operations against one connected orchestrator.
#[async_trait]
pub trait PodClient: Send + Sync {
    /// Create a pod, returning it as the orchestrator stored it
    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, OrchestratorError>;

    /// Current state of a pod; `None` when it does not exist
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, OrchestratorError>;

    /// Delete a pod, returning how many pods were removed (0 or 1)
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<usize, OrchestratorError>;

    /// Set one annotation on a pod. A missing pod is `NotFound`.
    async fn patch_annotation(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), OrchestratorError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Orchestrator, OrchestratorError, PodClient};
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::Pod;
    use parking_lot::Mutex;
    use pw_core::CloudConfig;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Recorded orchestrator call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PodCall {
        Connect { cloud: String },
        Create { namespace: String, name: String },
        Get { namespace: String, name: String },
        Delete { namespace: String, name: String },
        Patch { namespace: String, name: String, key: String, value: String },
    }

    #[derive(Default)]
    struct FakeState {
        pods: HashMap<(String, String), Pod>,
        calls: Vec<PodCall>,
        connect_error: Option<OrchestratorError>,
        create_error: Option<OrchestratorError>,
        get_error: Option<OrchestratorError>,
        delete_error: Option<OrchestratorError>,
        patch_error: Option<OrchestratorError>,
        deleted_override: Option<usize>,
        create_gate: Option<Arc<Notify>>,
        delete_gate: Option<Arc<Notify>>,
    }

    /// In-memory orchestrator for testing.
    ///
    /// Every client it hands out shares the same pod table and call log.
    #[derive(Clone, Default)]
    pub struct FakeOrchestrator {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeOrchestrator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert_pod(&self, namespace: &str, pod: Pod) {
            let name = pod.metadata.name.clone().unwrap_or_default();
            self.inner.lock().pods.insert((namespace.to_string(), name), pod);
        }

        pub fn remove_pod(&self, namespace: &str, name: &str) -> Option<Pod> {
            self.inner.lock().pods.remove(&(namespace.to_string(), name.to_string()))
        }

        pub fn pod(&self, namespace: &str, name: &str) -> Option<Pod> {
            self.inner.lock().pods.get(&(namespace.to_string(), name.to_string())).cloned()
        }

        pub fn pod_count(&self) -> usize {
            self.inner.lock().pods.len()
        }

        pub fn calls(&self) -> Vec<PodCall> {
            self.inner.lock().calls.clone()
        }

        pub fn connect_count(&self) -> usize {
            self.count(|c| matches!(c, PodCall::Connect { .. }))
        }

        pub fn get_count(&self) -> usize {
            self.count(|c| matches!(c, PodCall::Get { .. }))
        }

        pub fn delete_count(&self) -> usize {
            self.count(|c| matches!(c, PodCall::Delete { .. }))
        }

        pub fn patch_count(&self) -> usize {
            self.count(|c| matches!(c, PodCall::Patch { .. }))
        }

        pub fn fail_connect(&self, error: OrchestratorError) {
            self.inner.lock().connect_error = Some(error);
        }

        pub fn fail_create(&self, error: OrchestratorError) {
            self.inner.lock().create_error = Some(error);
        }

        pub fn fail_get(&self, error: OrchestratorError) {
            self.inner.lock().get_error = Some(error);
        }

        pub fn fail_delete(&self, error: OrchestratorError) {
            self.inner.lock().delete_error = Some(error);
        }

        pub fn fail_patch(&self, error: OrchestratorError) {
            self.inner.lock().patch_error = Some(error);
        }

        /// Let every operation succeed again
        pub fn clear_failures(&self) {
            let mut inner = self.inner.lock();
            inner.connect_error = None;
            inner.create_error = None;
            inner.get_error = None;
            inner.delete_error = None;
            inner.patch_error = None;
        }

        /// Make every delete report `count` removed pods.
        pub fn report_deleted(&self, count: usize) {
            self.inner.lock().deleted_override = Some(count);
        }

        /// Hold each create until the returned gate is notified. The call
        /// is recorded and the pod does not exist while it is held.
        pub fn hold_creates(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.inner.lock().create_gate = Some(Arc::clone(&gate));
            gate
        }

        /// Hold each delete response until the returned gate is notified.
        /// The pod is already gone while it is held.
        pub fn hold_deletes(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.inner.lock().delete_gate = Some(Arc::clone(&gate));
            gate
        }

        pub fn create_count(&self) -> usize {
            self.count(|c| matches!(c, PodCall::Create { .. }))
        }

        fn count(&self, pred: impl Fn(&PodCall) -> bool) -> usize {
            self.inner.lock().calls.iter().filter(|c| pred(c)).count()
        }
    }

    #[async_trait]
    impl Orchestrator for FakeOrchestrator {
        async fn connect(
            &self,
            cloud: &CloudConfig,
        ) -> Result<Arc<dyn PodClient>, OrchestratorError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PodCall::Connect { cloud: cloud.name.clone() });
            match &inner.connect_error {
                Some(e) => Err(e.clone()),
                None => Ok(Arc::new(self.clone())),
            }
        }
    }

    #[async_trait]
    impl PodClient for FakeOrchestrator {
        async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, OrchestratorError> {
            let name = pod.metadata.name.clone().unwrap_or_default();
            let gate = {
                let mut inner = self.inner.lock();
                inner.calls.push(PodCall::Create { namespace: namespace.into(), name: name.clone() });
                if let Some(e) = &inner.create_error {
                    return Err(e.clone());
                }
                inner.create_gate.clone()
            };
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.inner.lock().pods.insert((namespace.to_string(), name), pod.clone());
            Ok(pod.clone())
        }

        async fn get_pod(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<Option<Pod>, OrchestratorError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PodCall::Get { namespace: namespace.into(), name: name.into() });
            if let Some(e) = &inner.get_error {
                return Err(e.clone());
            }
            Ok(inner.pods.get(&(namespace.to_string(), name.to_string())).cloned())
        }

        async fn delete_pod(&self, namespace: &str, name: &str) -> Result<usize, OrchestratorError> {
            let (removed, gate) = {
                let mut inner = self.inner.lock();
                inner.calls.push(PodCall::Delete { namespace: namespace.into(), name: name.into() });
                if let Some(e) = &inner.delete_error {
                    return Err(e.clone());
                }
                let removed = inner.pods.remove(&(namespace.to_string(), name.to_string()));
                let removed = inner.deleted_override.unwrap_or(usize::from(removed.is_some()));
                (removed, inner.delete_gate.clone())
            };
            if let Some(gate) = gate {
                gate.notified().await;
            }
            Ok(removed)
        }

        async fn patch_annotation(
            &self,
            namespace: &str,
            name: &str,
            key: &str,
            value: &str,
        ) -> Result<(), OrchestratorError> {
            let mut inner = self.inner.lock();
            inner.calls.push(PodCall::Patch {
                namespace: namespace.into(),
                name: name.into(),
                key: key.into(),
                value: value.into(),
            });
            if let Some(e) = &inner.patch_error {
                return Err(e.clone());
            }
            let pod = inner
                .pods
                .get_mut(&(namespace.to_string(), name.to_string()))
                .ok_or_else(|| OrchestratorError::NotFound(format!("{}/{}", namespace, name)))?;
            pod.metadata
                .annotations
                .get_or_insert_with(Default::default)
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeOrchestrator, PodCall};
