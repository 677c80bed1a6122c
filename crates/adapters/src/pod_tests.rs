// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_core::TemplateId;

fn template() -> Template {
    let mut template = Template::new(TemplateId::from("maven"), "maven")
        .containers(vec![
            ContainerSpec::new("jnlp", "agent:4"),
            ContainerSpec {
                working_dir: "/src".into(),
                command: vec!["sleep".into()],
                args: vec!["infinity".into()],
                tty: Some(true),
                env: [("MAVEN_OPTS".to_string(), "-q".to_string())].into(),
                ..ContainerSpec::new("build", "maven:3")
            },
        ])
        .volumes(vec![
            VolumeSpec::empty_dir("/tmp/work"),
            VolumeSpec {
                mount_path: "/cache".into(),
                source: VolumeSource::PersistentClaim { claim_name: "m2".into(), read_only: true },
            },
        ]);
    template.labels.insert("team".into(), "infra".into());
    template.labels.insert("app".into(), "maven".into());
    template.annotations.insert("owner".into(), "ci".into());
    template
}

#[test]
fn metadata_merges_labels_and_names_the_pod() {
    let pod = build_pod(&template(), &CloudConfig::new("k8s"), "maven-x7q2b", "ci");
    let meta = &pod.metadata;
    assert_eq!(meta.name.as_deref(), Some("maven-x7q2b"));
    assert_eq!(meta.namespace.as_deref(), Some("ci"));

    let labels = meta.labels.as_ref().unwrap();
    assert_eq!(labels["app"], "maven");
    assert_eq!(labels["team"], "infra");
    assert_eq!(labels[AGENT_LABEL], "maven-x7q2b");
    assert_eq!(meta.annotations.as_ref().unwrap()["owner"], "ci");
}

#[test]
fn containers_carry_template_fields() {
    let pod = build_pod(&template(), &CloudConfig::new("k8s"), "maven-x7q2b", "ci");
    let spec = pod.spec.unwrap();
    assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
    assert_eq!(spec.containers.len(), 2);

    let jnlp = &spec.containers[0];
    assert_eq!(jnlp.image.as_deref(), Some("agent:4"));
    assert_eq!(jnlp.working_dir.as_deref(), Some("/home/agent"));
    assert!(jnlp.command.is_none());

    let build = &spec.containers[1];
    assert_eq!(build.working_dir.as_deref(), Some("/src"));
    assert_eq!(build.command, Some(vec!["sleep".to_string()]));
    assert_eq!(build.args, Some(vec!["infinity".to_string()]));
    assert_eq!(build.tty, Some(true));
    assert_eq!(build.env.as_ref().unwrap()[0].name, "MAVEN_OPTS");
}

#[test]
fn volumes_are_mounted_everywhere() {
    let pod = build_pod(&template(), &CloudConfig::new("k8s"), "maven-x7q2b", "ci");
    let spec = pod.spec.unwrap();
    let volumes = spec.volumes.unwrap();
    assert_eq!(volumes.len(), 2);
    assert!(volumes[0].empty_dir.is_some());
    assert_eq!(volumes[1].persistent_volume_claim.as_ref().unwrap().claim_name, "m2");

    for container in &spec.containers {
        let mounts = container.volume_mounts.as_ref().unwrap();
        let paths: Vec<_> = mounts.iter().map(|m| m.mount_path.as_str()).collect();
        assert_eq!(paths, vec!["/tmp/work", "/cache"]);
        assert_eq!(mounts[1].read_only, Some(true));
    }
}

#[yare::parameterized(
    memory     = { VolumeSource::EmptyDir { memory: true } },
    host_path  = { VolumeSource::HostPath { host_path: "/var/run/docker.sock".into() } },
    config_map = { VolumeSource::ConfigMap { name: "settings".into() } },
    secret     = { VolumeSource::Secret { secret_name: "creds".into() } },
)]
fn each_volume_source_sets_exactly_one_field(source: VolumeSource) {
    let volume = volume("v", &source);
    let set = [
        volume.empty_dir.is_some(),
        volume.host_path.is_some(),
        volume.config_map.is_some(),
        volume.secret.is_some(),
        volume.persistent_volume_claim.is_some(),
    ];
    assert_eq!(set.iter().filter(|s| **s).count(), 1);
}

#[test]
fn empty_template_has_no_optional_sections() {
    let template = Template::new(TemplateId::from("bare"), "bare");
    let pod = build_pod(&template, &CloudConfig::new("k8s"), "bare-x7q2b", "default");
    assert!(pod.metadata.annotations.is_none());
    assert!(pod.spec.unwrap().volumes.is_none());
}
