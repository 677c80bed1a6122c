// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes orchestrator backed by kube-rs.
//!
//! Clients are cached per cloud name; building one reads kubeconfig (or the
//! in-cluster service account) but does not touch the network.

use crate::orchestrator::{Orchestrator, OrchestratorError, PodClient};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::config::KubeConfigOptions;
use kube::Client;
use parking_lot::Mutex;
use pw_core::CloudConfig;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct KubeOrchestrator {
    clients: Arc<Mutex<HashMap<String, Client>>>,
}

impl KubeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    async fn build_client(cloud: &CloudConfig) -> Result<Client, OrchestratorError> {
        match &cloud.context {
            Some(context) => {
                let options =
                    KubeConfigOptions { context: Some(context.clone()), ..Default::default() };
                let config = kube::Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| OrchestratorError::Auth(e.to_string()))?;
                Client::try_from(config).map_err(|e| OrchestratorError::Connection(e.to_string()))
            }
            None => Client::try_default().await.map_err(|e| match e {
                kube::Error::Auth(e) => OrchestratorError::Auth(e.to_string()),
                kube::Error::InferConfig(e) => OrchestratorError::Auth(e.to_string()),
                other => OrchestratorError::Connection(other.to_string()),
            }),
        }
    }
}

#[async_trait]
impl Orchestrator for KubeOrchestrator {
    async fn connect(&self, cloud: &CloudConfig) -> Result<Arc<dyn PodClient>, OrchestratorError> {
        let cached = self.clients.lock().get(&cloud.name).cloned();
        let client = match cached {
            Some(client) => client,
            None => {
                let client = Self::build_client(cloud).await?;
                tracing::debug!(cloud = %cloud.name, "created kube client");
                self.clients.lock().insert(cloud.name.clone(), client.clone());
                client
            }
        };
        Ok(Arc::new(KubePodClient { client }))
    }
}

struct KubePodClient {
    client: Client,
}

impl KubePodClient {
    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl PodClient for KubePodClient {
    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, OrchestratorError> {
        let name = pod.metadata.name.as_deref().unwrap_or_default();
        tracing::info!(pod = %name, %namespace, "creating pod");
        self.pods(namespace)
            .create(&PostParams::default(), pod)
            .await
            .map_err(|e| classify(e, namespace, name))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, OrchestratorError> {
        self.pods(namespace).get_opt(name).await.map_err(|e| classify(e, namespace, name))
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<usize, OrchestratorError> {
        match self.pods(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(1),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(0),
            Err(e) => Err(classify(e, namespace, name)),
        }
    }

    async fn patch_annotation(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), OrchestratorError> {
        let patch = serde_json::json!({ "metadata": { "annotations": { key: value } } });
        self.pods(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, namespace, name))
    }
}

fn classify(error: kube::Error, namespace: &str, name: &str) -> OrchestratorError {
    match error {
        kube::Error::Api(resp) if resp.code == 404 => {
            OrchestratorError::NotFound(format!("{}/{}", namespace, name))
        }
        kube::Error::Api(resp) if resp.code == 401 || resp.code == 403 => {
            OrchestratorError::Auth(resp.message)
        }
        kube::Error::Auth(e) => OrchestratorError::Auth(e.to_string()),
        kube::Error::Service(e) => OrchestratorError::Connection(e.to_string()),
        other => OrchestratorError::Api(other.to_string()),
    }
}
