// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults() {
    let cloud = CloudConfig::new("k8s");
    assert_eq!(cloud.name, "k8s");
    assert_eq!(cloud.retention_timeout_minutes, 5);
    assert_eq!(cloud.disconnect_timeout(), Duration::from_secs(5));
    assert_eq!(cloud.main_container, "jnlp");
    assert_eq!(cloud.default_working_dir, "/home/agent");
    assert_eq!(cloud.pod_labels.get("app").map(String::as_str), Some("podwright-agent"));
    assert!(!cloud.garbage_collection_enabled());
}

#[yare::parameterized(
    zero_coerced = { 0, 5 },
    kept         = { 9, 9 },
)]
fn retention_timeout_setter(minutes: u32, expected: u32) {
    assert_eq!(CloudConfig::new("k8s").retention_timeout_minutes(minutes).retention_timeout_minutes, expected);
}

#[test]
fn zero_retention_timeout_in_toml_is_coerced() {
    let cloud: CloudConfig = toml::from_str(
        r#"
        name = "k8s"
        retention_timeout_minutes = 0
        garbage_collection = { timeout_secs = 300 }
        "#,
    )
    .unwrap();
    assert_eq!(cloud.retention_timeout_minutes, 5);
    assert_eq!(cloud.garbage_collection, Some(GarbageCollection { timeout_secs: 300 }));
    assert_eq!(cloud.namespace, "default");
}

#[test]
fn template_namespace_overrides_cloud() {
    let cloud = CloudConfig::new("k8s").namespace("ci");
    assert_eq!(cloud.namespace_for(""), "ci");
    assert_eq!(cloud.namespace_for("team-a"), "team-a");
}
