// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::pods;
use std::cell::Cell;

const NOW: u64 = 1_700_000_000_000;

fn cloud() -> CloudConfig {
    CloudConfig::new("k8s")
}

async fn decide(policy: &RetentionPolicy, pod: Option<Pod>) -> (bool, usize) {
    let fetches = Cell::new(0);
    let delete = policy
        .should_delete(&cloud(), NOW, || {
            fetches.set(fetches.get() + 1);
            async move { pod }
        })
        .await;
    (delete, fetches.get())
}

#[tokio::test]
async fn always_and_never_delete_do_not_fetch() {
    let running = Some(pods::pod("a"));
    assert_eq!(decide(&RetentionPolicy::AlwaysDelete, running.clone()).await, (true, 0));
    assert_eq!(decide(&RetentionPolicy::NeverDelete, running).await, (false, 0));
}

#[tokio::test]
async fn retain_on_failure_keeps_failed_pods() {
    let cases = [
        (pods::pod("a"), true),
        (pods::with_phase(pods::pod("a"), "Succeeded"), true),
        (pods::with_phase(pods::pod("a"), "Failed"), false),
        (pods::with_phase(pods::pod("a"), "Unknown"), false),
        (pods::with_exit_code(pods::pod("a"), "build", 0), true),
        (pods::with_exit_code(pods::pod("a"), "build", 137), false),
    ];
    for (pod, expected) in cases {
        let (delete, fetches) = decide(&RetentionPolicy::RetainOnFailure, Some(pod)).await;
        assert_eq!(delete, expected);
        assert_eq!(fetches, 1);
    }
}

#[tokio::test]
async fn absent_pod_is_deleted() {
    assert_eq!(decide(&RetentionPolicy::RetainOnFailure, None).await, (true, 1));
    assert_eq!(decide(&RetentionPolicy::DeleteIfIdleAfter { after_secs: 60 }, None).await, (true, 1));
}

#[tokio::test]
async fn idle_policy_uses_refresh_annotation_over_creation_time() {
    let policy = RetentionPolicy::DeleteIfIdleAfter { after_secs: 600 };
    let old = pods::created_at(pods::pod("a"), NOW - 3_600_000);

    assert!(decide(&policy, Some(old.clone())).await.0);

    let recent = (NOW - 60_000).to_string();
    let refreshed = pods::with_annotation(old, TTL_ANNOTATION, &recent);
    assert!(!decide(&policy, Some(refreshed)).await.0);
}

#[tokio::test]
async fn idle_policy_boundary_is_inclusive() {
    let policy = RetentionPolicy::DeleteIfIdleAfter { after_secs: 600 };
    let at_limit = pods::created_at(pods::pod("a"), NOW - 600_000);
    let just_under = pods::created_at(pods::pod("a"), NOW - 599_999);
    assert!(decide(&policy, Some(at_limit)).await.0);
    assert!(!decide(&policy, Some(just_under)).await.0);
}

#[tokio::test]
async fn cloud_default_defers_to_cloud() {
    let cloud = cloud().default_retention(RetentionPolicy::NeverDelete);
    let delete = RetentionPolicy::CloudDefault
        .should_delete(&cloud, NOW, || async { Some(pods::pod("a")) })
        .await;
    assert!(!delete);
}

#[yare::parameterized(
    template_wins        = { Some(RetentionPolicy::NeverDelete),   RetentionPolicy::RetainOnFailure, RetentionPolicy::NeverDelete },
    template_defers      = { Some(RetentionPolicy::CloudDefault),  RetentionPolicy::RetainOnFailure, RetentionPolicy::RetainOnFailure },
    template_unset       = { None,                                 RetentionPolicy::NeverDelete,     RetentionPolicy::NeverDelete },
    both_defer           = { Some(RetentionPolicy::CloudDefault),  RetentionPolicy::CloudDefault,    RetentionPolicy::AlwaysDelete },
    unset_and_defer      = { None,                                 RetentionPolicy::CloudDefault,    RetentionPolicy::AlwaysDelete },
)]
fn effective_policy(template: Option<RetentionPolicy>, cloud_default: RetentionPolicy, expected: RetentionPolicy) {
    let cloud = cloud().default_retention(cloud_default);
    assert_eq!(RetentionPolicy::effective(template.as_ref(), &cloud), expected);
}

#[yare::parameterized(
    short_name = { r#"retention = "never_delete""#,                                     RetentionPolicy::NeverDelete },
    block_name = { r#"retention = { kind = "retain_on_failure" }"#,                     RetentionPolicy::RetainOnFailure },
    idle_block = { r#"retention = { kind = "delete_if_idle_after", after_secs = 90 }"#, RetentionPolicy::DeleteIfIdleAfter { after_secs: 90 } },
)]
fn parses_from_toml(text: &str, expected: RetentionPolicy) {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        retention: RetentionPolicy,
    }
    let parsed: Wrapper = toml::from_str(text).unwrap();
    assert_eq!(parsed.retention, expected);
}

#[test]
fn rejects_unknown_or_incomplete_policies() {
    assert!(serde_json::from_str::<RetentionPolicy>(r#""sometimes""#).is_err());
    assert!(serde_json::from_str::<RetentionPolicy>(r#"{"kind":"delete_if_idle_after"}"#).is_err());
}

#[test]
fn json_form_reads_back() {
    for policy in [RetentionPolicy::RetainOnFailure, RetentionPolicy::delete_if_idle_after(Duration::from_secs(30))] {
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(serde_json::from_str::<RetentionPolicy>(&json).unwrap(), policy);
    }
}

#[test]
fn display() {
    assert_eq!(RetentionPolicy::AlwaysDelete.to_string(), "always_delete");
    assert_eq!(RetentionPolicy::DeleteIfIdleAfter { after_secs: 5 }.to_string(), "delete_if_idle_after(5s)");
}
