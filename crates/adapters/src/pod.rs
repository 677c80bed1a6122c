// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod manifest construction for build agents.

use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, EmptyDirVolumeSource, EnvVar, HostPathVolumeSource,
    PersistentVolumeClaimVolumeSource, Pod, PodSpec, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use pw_core::{CloudConfig, ContainerSpec, Template, VolumeSource, VolumeSpec, AGENT_LABEL};
use std::collections::BTreeMap;

/// Build the pod for agent `name` from an effective template.
///
/// Labels are the cloud's pod labels, then the template's, then the agent
/// label; later sources win. Every volume is mounted into every container.
pub fn build_pod(template: &Template, cloud: &CloudConfig, name: &str, namespace: &str) -> Pod {
    let mut labels = cloud.pod_labels.clone();
    labels.extend(template.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
    labels.insert(AGENT_LABEL.to_string(), name.to_string());

    let volumes: Vec<(String, &VolumeSpec)> =
        template.volumes.iter().enumerate().map(|(i, v)| (format!("volume-{}", i), v)).collect();
    let mounts: Vec<VolumeMount> = volumes
        .iter()
        .map(|(volume_name, spec)| VolumeMount {
            name: volume_name.clone(),
            mount_path: spec.mount_path.clone(),
            read_only: match spec.source {
                VolumeSource::PersistentClaim { read_only: true, .. } => Some(true),
                _ => None,
            },
            ..Default::default()
        })
        .collect();

    let containers = template
        .containers
        .iter()
        .map(|c| container(c, &cloud.default_working_dir, &mounts))
        .collect();

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            annotations: non_empty(template.annotations.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers,
            volumes: if volumes.is_empty() {
                None
            } else {
                Some(volumes.iter().map(|(n, spec)| volume(n, &spec.source)).collect())
            },
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn container(spec: &ContainerSpec, default_working_dir: &str, mounts: &[VolumeMount]) -> Container {
    let working_dir =
        if spec.working_dir.is_empty() { default_working_dir } else { &spec.working_dir };
    Container {
        name: spec.name.clone(),
        image: non_blank(&spec.image),
        working_dir: non_blank(working_dir),
        command: non_empty_vec(&spec.command),
        args: non_empty_vec(&spec.args),
        tty: spec.tty,
        env: if spec.env.is_empty() {
            None
        } else {
            Some(spec.env.iter().map(|(k, v)| env_var(k, v)).collect())
        },
        volume_mounts: if mounts.is_empty() { None } else { Some(mounts.to_vec()) },
        ..Default::default()
    }
}

fn volume(name: &str, source: &VolumeSource) -> Volume {
    let mut volume = Volume { name: name.to_string(), ..Default::default() };
    match source {
        VolumeSource::EmptyDir { memory } => {
            volume.empty_dir = Some(EmptyDirVolumeSource {
                medium: memory.then(|| "Memory".to_string()),
                ..Default::default()
            });
        }
        VolumeSource::PersistentClaim { claim_name, read_only } => {
            volume.persistent_volume_claim = Some(PersistentVolumeClaimVolumeSource {
                claim_name: claim_name.clone(),
                read_only: Some(*read_only),
            });
        }
        VolumeSource::HostPath { host_path } => {
            volume.host_path =
                Some(HostPathVolumeSource { path: host_path.clone(), ..Default::default() });
        }
        VolumeSource::ConfigMap { name } => {
            volume.config_map =
                Some(ConfigMapVolumeSource { name: name.clone(), ..Default::default() });
        }
        VolumeSource::Secret { secret_name } => {
            volume.secret = Some(SecretVolumeSource {
                secret_name: Some(secret_name.clone()),
                ..Default::default()
            });
        }
    }
    volume
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar { name: name.to_string(), value: Some(value.to_string()), ..Default::default() }
}

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn non_empty_vec(v: &[String]) -> Option<Vec<String>> {
    if v.is_empty() {
        None
    } else {
        Some(v.to_vec())
    }
}

fn non_empty(map: BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
#[path = "pod_tests.rs"]
mod tests;
