// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_core::test_support::{jnlp_template, pods};
use pw_core::{AgentStatus, AgentStrategy, TemplateId};

fn record(name: &str) -> AgentRecord {
    AgentRecord::new(
        AgentName::from(name),
        "k8s",
        &jnlp_template("maven"),
        "ci",
        AgentStrategy::Idle { idle_minutes: 10 },
        1_000,
    )
}

#[test]
fn save_then_load_all() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(&record("b-agent")).unwrap();
    store.save(&record("a-agent")).unwrap();

    let names: Vec<_> = store.load_all().unwrap().into_iter().map(|r| r.name.0).collect();
    assert_eq!(names, vec!["a-agent", "b-agent"]);
}

#[test]
fn save_overwrites_and_drops_runtime_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let mut rec = record("a-agent");
    store.save(&rec).unwrap();

    rec.assign_pod(pods::pod("a-agent"), "jnlp", "/home/agent").unwrap();
    rec.bind_executable("build#1");
    store.save(&rec).unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].status, AgentStatus::Bound);
    assert!(loaded[0].pod().is_none());
    assert!(loaded[0].executables().is_empty());
}

#[test]
fn remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(&record("a-agent")).unwrap();
    store.remove(&AgentName::from("a-agent")).unwrap();
    store.remove(&AgentName::from("a-agent")).unwrap();
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn empty_state_dir_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("missing"));
    assert!(store.load_all().unwrap().is_empty());
    assert!(store.load_templates("k8s").unwrap().is_empty());
}

#[test]
fn corrupt_record_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(&record("good")).unwrap();
    std::fs::write(dir.path().join("agents/broken.json"), b"{not json").unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(dir.path().join("agents/broken.bak").exists());
    assert!(!dir.path().join("agents/broken.json").exists());
}

#[test]
fn newer_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates/k8s.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"v":99,"saved_at":"2026-01-01T00:00:00Z","templates":[]}"#).unwrap();

    let err = FileStore::new(dir.path()).load_templates("k8s").unwrap_err();
    assert!(matches!(err, StoreError::Version(99)));
}

#[test]
fn templates_round_trip_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let registry = TemplateRegistry::from_templates([
        jnlp_template("base"),
        jnlp_template("maven").inherit_from(vec![TemplateId::from("base")]),
    ]);
    store.save_templates("k8s", &registry).unwrap();

    let loaded = store.load_templates("k8s").unwrap();
    let ids: Vec<_> = loaded.templates().iter().map(|t| t.id.to_string()).collect();
    assert_eq!(ids, vec!["base", "maven"]);
    assert_eq!(loaded.resolve(&TemplateId::from("maven")).unwrap(), registry.resolve(&TemplateId::from("maven")).unwrap());
}

#[test]
fn bak_rotation_keeps_three() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.json");
    for i in 0..5 {
        let bak = rotate_bak_path(&path);
        std::fs::write(&bak, format!("{i}")).unwrap();
    }
    assert_eq!(std::fs::read_to_string(dir.path().join("x.bak")).unwrap(), "4");
    assert_eq!(std::fs::read_to_string(dir.path().join("x.bak.2")).unwrap(), "3");
    assert_eq!(std::fs::read_to_string(dir.path().join("x.bak.3")).unwrap(), "2");
    assert!(!dir.path().join("x.bak.4").exists());
}
