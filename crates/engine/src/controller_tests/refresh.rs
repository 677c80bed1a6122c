// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_core::TTL_ANNOTATION;

fn gc_setup() -> Harness {
    setup_with(cloud_config().garbage_collection(GarbageCollection { timeout_secs: 300 }))
}

#[tokio::test]
async fn refresh_is_disabled_without_garbage_collection() {
    let h = setup();
    let record = h.provision("t2").await;

    assert_eq!(h.controller.refresh_ttl(&record.name).await, RefreshOutcome::Disabled);
    assert_eq!(h.orchestrator.patch_count(), 0);
}

#[tokio::test]
async fn refresh_stamps_pod_and_record() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    let listener = with_listener(&h, &record.name);
    h.clock.advance(Duration::from_secs(90));
    let now = h.clock.epoch_ms();

    let outcome = h.controller.refresh_ttl(&record.name).await;

    assert_eq!(outcome, RefreshOutcome::Refreshed { at_ms: now });
    assert_eq!(listener.lines(), vec![format!("INFO Annotated agent pod {}/{} with TTL", NS, record.name)]);
    let pod = h.orchestrator.pod(NS, &record.name).unwrap();
    let stamped = pod.metadata.annotations.unwrap().get(TTL_ANNOTATION).cloned();
    assert_eq!(stamped, Some(now.to_string()));
    assert_eq!(h.controller.record(&record.name).unwrap().last_refresh_ms, Some(now));
    assert_eq!(h.store.get(&record.name).unwrap().last_refresh_ms, Some(now));
}

#[tokio::test]
async fn refresh_does_not_change_status() {
    let h = gc_setup();
    let record = h.provision("t1").await;
    h.controller.refresh_ttl(&record.name).await;
    assert_eq!(h.status(&record.name), AgentStatus::Bound);
}

#[tokio::test]
async fn refresh_of_vanished_pod_reports_gone() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    h.orchestrator.remove_pod(NS, &record.name);

    assert_eq!(h.controller.refresh_ttl(&record.name).await, RefreshOutcome::PodGone);
    assert_eq!(h.status(&record.name), AgentStatus::Bound);
    assert_eq!(h.controller.record(&record.name).unwrap().last_refresh_ms, None);
}

#[tokio::test]
async fn refresh_patch_failure_is_skipped() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.fail_patch(OrchestratorError::Api("conflict".into()));

    let outcome = h.controller.refresh_ttl(&record.name).await;

    assert!(matches!(outcome, RefreshOutcome::Skipped { ref reason } if reason.contains("conflict")));
    assert!(listener.contains(&format!(
        "ERROR Failed to annotate agent pod {}/{} with TTL: api error: conflict",
        NS, record.name
    )));
    assert_eq!(h.controller.record(&record.name).unwrap().last_refresh_ms, None);
}

#[tokio::test]
async fn refresh_connect_failure_is_skipped() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.fail_connect(OrchestratorError::Connection("refused".into()));

    let outcome = h.controller.refresh_ttl(&record.name).await;

    assert!(matches!(outcome, RefreshOutcome::Skipped { .. }), "{:?}", outcome);
    assert_eq!(h.orchestrator.patch_count(), 0);
    assert_eq!(
        listener.lines(),
        vec!["ERROR Failed to connect to Kubernetes cluster: connection failed: refused".to_string()]
    );
}

#[tokio::test]
async fn refresh_auth_failure_is_reported_to_listener() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.fail_connect(OrchestratorError::Auth("expired".into()));

    let outcome = h.controller.refresh_ttl(&record.name).await;

    assert!(matches!(outcome, RefreshOutcome::Skipped { ref reason } if reason.contains("expired")));
    assert_eq!(
        listener.lines(),
        vec!["ERROR Failed to authenticate to Kubernetes cluster: authentication failed: expired".to_string()]
    );
}

#[tokio::test]
async fn refresh_skips_unknown_and_terminal_agents() {
    let h = gc_setup();
    let ghost = h.controller.refresh_ttl(&AgentName::from("ghost")).await;
    assert!(matches!(ghost, RefreshOutcome::Skipped { .. }));

    let record = h.provision("t2").await;
    h.controller.terminate(&record.name).await;
    let terminal = h.controller.refresh_ttl(&record.name).await;
    assert!(matches!(terminal, RefreshOutcome::Skipped { ref reason } if reason.contains("terminated")));
    assert_eq!(h.orchestrator.patch_count(), 0);
}

#[tokio::test]
async fn refresh_skips_agent_of_removed_cloud() {
    let h = gc_setup();
    let record = h.provision("t2").await;
    let listener = with_listener(&h, &record.name);
    h.controller.remove_cloud("k8s");

    let outcome = h.controller.refresh_ttl(&record.name).await;
    assert!(matches!(outcome, RefreshOutcome::Skipped { ref reason } if reason.contains("k8s")));
    assert!(listener.contains("ERROR Failed to annotate agent pod"));
    assert_eq!(h.orchestrator.patch_count(), 0);
}
