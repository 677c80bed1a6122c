// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::template::{ContainerSpec, Template, TemplateId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for template fragments.
///
/// Keys are drawn from small pools so that generated fragments overlap and
/// the merge paths are actually exercised.
pub mod strategies {
    use crate::retention::RetentionPolicy;
    use crate::template::{
        ContainerSpec, NodeUsageMode, Template, TemplateId, VolumeSource, VolumeSpec,
    };
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn small_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        btree_map(prop_oneof![Just("A"), Just("B"), Just("C")].prop_map(String::from), "[a-z]{0,3}", 0..3)
    }

    fn maybe_str() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[a-z]{1,4}"]
    }

    pub fn arb_container() -> impl Strategy<Value = ContainerSpec> {
        (
            prop_oneof![Just("jnlp"), Just("build"), Just("db")],
            maybe_str(),
            maybe_str(),
            vec("[a-z]{1,3}", 0..2),
            vec("[a-z]{1,3}", 0..2),
            any::<Option<bool>>(),
            small_map(),
        )
            .prop_map(|(name, image, working_dir, command, args, tty, env)| ContainerSpec {
                name: name.to_string(),
                image,
                working_dir,
                command,
                args,
                tty,
                env,
            })
    }

    pub fn arb_volume() -> impl Strategy<Value = VolumeSpec> {
        let source = prop_oneof![
            any::<bool>().prop_map(|memory| VolumeSource::EmptyDir { memory }),
            "[a-z]{1,4}".prop_map(|host_path| VolumeSource::HostPath { host_path }),
        ];
        (prop_oneof![Just("/cache"), Just("/work")], source)
            .prop_map(|(mount_path, source)| VolumeSpec { mount_path: mount_path.to_string(), source })
    }

    pub fn arb_retention() -> impl Strategy<Value = RetentionPolicy> {
        prop_oneof![
            Just(RetentionPolicy::CloudDefault),
            Just(RetentionPolicy::AlwaysDelete),
            Just(RetentionPolicy::NeverDelete),
            Just(RetentionPolicy::RetainOnFailure),
            (1u64..10_000).prop_map(|after_secs| RetentionPolicy::DeleteIfIdleAfter { after_secs }),
        ]
    }

    pub fn arb_template() -> impl Strategy<Value = Template> {
        (
            "[a-z]{1,6}",
            maybe_str(),
            maybe_str(),
            proptest::option::of(prop_oneof![Just(NodeUsageMode::Normal), Just(NodeUsageMode::Exclusive)]),
            vec(arb_container(), 0..3),
            vec(arb_volume(), 0..2),
            proptest::option::of(0u32..60),
            proptest::option::of(arb_retention()),
            any::<Option<bool>>(),
            small_map(),
        )
            .prop_map(
                |(id, name, namespace, node_usage_mode, containers, volumes, idle_minutes, retention, show_raw_yaml, labels)| {
                    Template {
                        id: TemplateId::from(id),
                        name,
                        label: String::new(),
                        node_usage_mode,
                        namespace,
                        containers,
                        volumes,
                        idle_minutes,
                        retention,
                        show_raw_yaml,
                        labels,
                        annotations: BTreeMap::new(),
                        inherit_from: Vec::new(),
                    }
                },
            )
    }
}

// ── Pod fixtures ────────────────────────────────────────────────────────

/// Builders for `Pod` objects as the orchestrator would report them.
pub mod pods {
    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::core::v1::{
        Container, ContainerState, ContainerStateTerminated, ContainerStatus, Pod, PodSpec,
        PodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

    pub fn pod(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta { name: Some(name.to_string()), ..Default::default() },
            spec: Some(PodSpec::default()),
            status: Some(PodStatus { phase: Some("Running".to_string()), ..Default::default() }),
        }
    }

    pub fn with_phase(mut pod: Pod, phase: &str) -> Pod {
        pod.status.get_or_insert_with(Default::default).phase = Some(phase.to_string());
        pod
    }

    pub fn with_exit_code(mut pod: Pod, container: &str, exit_code: i32) -> Pod {
        let status = ContainerStatus {
            name: container.to_string(),
            state: Some(ContainerState {
                terminated: Some(ContainerStateTerminated { exit_code, ..Default::default() }),
                ..Default::default()
            }),
            ..Default::default()
        };
        pod.status
            .get_or_insert_with(Default::default)
            .container_statuses
            .get_or_insert_with(Vec::new)
            .push(status);
        pod
    }

    pub fn with_annotation(mut pod: Pod, key: &str, value: &str) -> Pod {
        pod.metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(key.to_string(), value.to_string());
        pod
    }

    pub fn created_at(mut pod: Pod, epoch_ms: u64) -> Pod {
        pod.metadata.creation_timestamp =
            Utc.timestamp_millis_opt(epoch_ms as i64).single().map(Time);
        pod
    }

    pub fn with_container(mut pod: Pod, name: &str, working_dir: Option<&str>) -> Pod {
        pod.spec.get_or_insert_with(Default::default).containers.push(Container {
            name: name.to_string(),
            working_dir: working_dir.map(str::to_string),
            ..Default::default()
        });
        pod
    }
}

// ── Template fixtures ───────────────────────────────────────────────────

/// A template with a single `jnlp` container.
pub fn jnlp_template(id: &str) -> Template {
    Template::new(TemplateId::from(id), id)
        .containers(vec![ContainerSpec::new("jnlp", "agent:latest")])
}
