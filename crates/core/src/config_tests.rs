// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::retention::RetentionPolicy;
use crate::template::{TemplateId, VolumeSource};

const SAMPLE: &str = r#"
[[cloud]]
name = "k8s"
namespace = "ci"
default_retention = "retain_on_failure"

[[cloud.template]]
id = "base"
name = "base"
idle_minutes = 10
labels = { team = "infra" }

[[cloud.template.container]]
name = "jnlp"
image = "agent:latest"
working_dir = "/home/jenkins"

[[cloud.template.volume]]
mount_path = "/cache"
type = "persistent_claim"
claim_name = "maven-cache"

[[cloud.template]]
id = "maven"
name = "maven"
inherit_from = ["base"]
retention = { kind = "delete_if_idle_after", after_secs = 600 }

[[cloud.template.container]]
name = "build"
image = "maven:3"
command = ["sleep"]
args = ["infinity"]
"#;

#[test]
fn parses_clouds_and_templates() {
    let config = Config::parse(SAMPLE).unwrap();
    let spec = config.cloud("k8s").unwrap();
    assert_eq!(spec.cloud.namespace, "ci");
    assert_eq!(spec.cloud.default_retention, RetentionPolicy::RetainOnFailure);
    assert_eq!(spec.templates.len(), 2);

    let base = &spec.templates[0];
    assert_eq!(base.idle_minutes, Some(10));
    assert_eq!(base.containers[0].working_dir, "/home/jenkins");
    assert_eq!(
        base.volumes[0].source,
        VolumeSource::PersistentClaim { claim_name: "maven-cache".into(), read_only: false }
    );

    let maven = &spec.templates[1];
    assert_eq!(maven.inherit_from, vec![TemplateId::from("base")]);
    assert_eq!(maven.retention, Some(RetentionPolicy::DeleteIfIdleAfter { after_secs: 600 }));
}

#[test]
fn registry_resolves_configured_inheritance() {
    let config = Config::parse(SAMPLE).unwrap();
    let registry = config.cloud("k8s").unwrap().registry();
    let effective = registry.resolve(&TemplateId::from("maven")).unwrap();

    let names: Vec<_> = effective.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["jnlp", "build"]);
    assert_eq!(effective.idle_minutes, Some(10));
    assert_eq!(effective.labels.get("team").map(String::as_str), Some("infra"));
}

#[test]
fn duplicate_cloud_names_are_rejected() {
    let err = Config::parse("[[cloud]]\nname = \"a\"\n[[cloud]]\nname = \"a\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateCloud(name) if name == "a"));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("podwright.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    assert_eq!(Config::load(&path).unwrap(), Config::parse(SAMPLE).unwrap());
}
