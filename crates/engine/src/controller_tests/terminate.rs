// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_adapters::Instruction;
use yare::parameterized;

#[tokio::test]
async fn terminate_deletes_pod_and_forgets_record() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Deleted);
    assert!(outcome.is_success());
    assert_eq!(h.status(&record.name), AgentStatus::Terminated);
    assert!(h.orchestrator.pod(NS, &record.name).is_none());
    assert!(h.controller.record(&record.name).unwrap().pod().is_none());
    assert!(h.store.get(&record.name).is_none());
    assert_eq!(
        listener.lines(),
        vec![
            format!("INFO Terminating Kubernetes instance for agent {}", record.name),
            format!("INFO Terminated Kubernetes instance for agent {}/{}", NS, record.name),
            format!("INFO Disconnected agent {}", record.name),
        ]
    );
}

#[tokio::test]
async fn never_delete_keeps_pod_without_delete_call() {
    let h = setup();
    let record = h.provision("keep").await;
    let listener = with_listener(&h, &record.name);

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Retained { policy: RetentionPolicy::NeverDelete });
    assert_eq!(h.orchestrator.delete_count(), 0);
    assert_eq!(h.orchestrator.get_count(), 0);
    assert!(h.orchestrator.pod(NS, &record.name).is_some());
    assert_eq!(h.status(&record.name), AgentStatus::Retained);
    assert!(listener.contains(&format!(
        "Pod {}/{} was not deleted due to retention policy never_delete",
        NS, record.name
    )));
    assert!(listener.contains(&format!("Disconnected agent {}", record.name)));
}

#[parameterized(
    failed_phase = { "Failed", 0, false },
    unknown_phase = { "Unknown", 0, false },
    non_zero_exit = { "Running", 137, false },
    healthy = { "Running", 0, true },
    succeeded = { "Succeeded", 0, true },
)]
#[test_macro(tokio::test)]
async fn retain_on_failure_inspects_pod(phase: &str, exit_code: i32, deleted: bool) {
    let h = setup();
    let record = h.provision("careful").await;
    let mut pod = pods::with_phase(pods::pod(&record.name), phase);
    if exit_code != 0 {
        pod = pods::with_exit_code(pod, "jnlp", exit_code);
    }
    h.orchestrator.insert_pod(NS, pod);

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(h.orchestrator.get_count(), 1);
    assert_eq!(h.orchestrator.delete_count(), usize::from(deleted));
    if deleted {
        assert_eq!(outcome, TerminationOutcome::Deleted);
    } else {
        assert_eq!(outcome, TerminationOutcome::Retained { policy: RetentionPolicy::RetainOnFailure });
    }
}

#[tokio::test]
async fn retain_on_failure_deletes_when_pod_is_unreadable() {
    let h = setup();
    let record = h.provision("careful").await;
    h.orchestrator.fail_get(OrchestratorError::Connection("reset".into()));

    let outcome = h.controller.terminate(&record.name).await;
    assert_eq!(outcome, TerminationOutcome::Deleted);
}

#[tokio::test]
async fn idle_retention_keeps_recently_refreshed_pod() {
    let h = setup_with(cloud_config().garbage_collection(GarbageCollection { timeout_secs: 300 }));
    let record = h.provision("idle").await;
    assert!(matches!(h.controller.refresh_ttl(&record.name).await, RefreshOutcome::Refreshed { .. }));
    h.clock.advance(Duration::from_secs(60));

    let outcome = h.controller.terminate(&record.name).await;

    assert!(matches!(outcome, TerminationOutcome::Retained { .. }), "{:?}", outcome);
    assert_eq!(h.orchestrator.delete_count(), 0);
}

#[tokio::test]
async fn idle_retention_deletes_stale_pod() {
    let h = setup();
    let record = h.provision("idle").await;
    let stale = pods::created_at(pods::pod(&record.name), h.clock.epoch_ms());
    h.orchestrator.insert_pod(NS, stale);
    h.clock.advance(Duration::from_secs(600));

    let outcome = h.controller.terminate(&record.name).await;
    assert_eq!(outcome, TerminationOutcome::Deleted);
}

#[tokio::test]
async fn cloud_default_retention_applies_when_template_has_none() {
    let h = setup_with(cloud_config().default_retention(RetentionPolicy::NeverDelete));
    let record = h.provision("t1").await;

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Retained { policy: RetentionPolicy::NeverDelete });
    assert_eq!(h.orchestrator.delete_count(), 0);
}

#[tokio::test]
async fn missing_pod_counts_as_terminated() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.remove_pod(NS, &record.name);

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::AlreadyGone);
    assert!(outcome.is_success());
    assert_eq!(h.status(&record.name), AgentStatus::Terminated);
    assert!(listener.contains(&format!("Pod {}/{} was already deleted", NS, record.name)));
}

#[tokio::test]
async fn delete_failure_leaves_agent_failed_and_retryable() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.fail_delete(OrchestratorError::Api("forbidden".into()));

    let outcome = h.controller.terminate(&record.name).await;

    assert!(matches!(outcome, TerminationOutcome::Failed { .. }), "{:?}", outcome);
    assert!(!outcome.is_success());
    assert_eq!(h.status(&record.name), AgentStatus::Failed);
    assert_eq!(h.store.get(&record.name).unwrap().status, AgentStatus::Failed);
    assert!(listener.contains(&format!(
        "ERROR Failed to terminate pod for agent {}/{}: api error: forbidden",
        NS, record.name
    )));

    h.orchestrator.clear_failures();
    assert_eq!(h.controller.terminate(&record.name).await, TerminationOutcome::Deleted);
    assert_eq!(h.status(&record.name), AgentStatus::Terminated);
}

#[tokio::test]
async fn unexpected_delete_count_fails_termination() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.report_deleted(2);

    let outcome = h.controller.terminate(&record.name).await;

    assert!(matches!(outcome, TerminationOutcome::Failed { ref reason } if reason.contains("2 were deleted")));
    assert_eq!(h.status(&record.name), AgentStatus::Failed);
    assert!(listener.contains("ERROR Expected to delete 1 pod"));
    assert!(!listener.contains("Disconnected agent"));
}

#[tokio::test]
async fn interrupted_termination_is_retried_after_restore() {
    let h = setup();
    let mut record = h.provision("t1").await;
    record.status = AgentStatus::Disconnecting;
    let json = serde_json::to_string(&record).unwrap();

    let fresh = setup();
    fresh.orchestrator.insert_pod(NS, pods::pod(&record.name));
    fresh.controller.restore([serde_json::from_str::<AgentRecord>(&json).unwrap()]);
    assert_eq!(fresh.status(&record.name), AgentStatus::Failed);
    assert_eq!(fresh.store.get(&record.name).unwrap().status, AgentStatus::Failed);

    let outcome = fresh.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Deleted);
    assert_eq!(fresh.orchestrator.delete_count(), 1);
    assert_eq!(fresh.orchestrator.pod_count(), 0);
}

#[tokio::test]
async fn terminate_is_a_no_op_once_terminal() {
    let h = setup();
    let record = h.provision("t1").await;
    h.controller.terminate(&record.name).await;

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Unchanged(AgentStatus::Terminated));
    assert_eq!(h.orchestrator.delete_count(), 1);
}

#[tokio::test]
async fn retained_agent_is_not_terminated_again() {
    let h = setup();
    let record = h.provision("keep").await;
    h.controller.terminate(&record.name).await;

    let outcome = h.controller.terminate(&record.name).await;
    assert_eq!(outcome, TerminationOutcome::Unchanged(AgentStatus::Retained));
}

#[tokio::test]
async fn terminate_unknown_agent_fails() {
    let h = setup();
    let outcome = h.controller.terminate(&AgentName::from("ghost")).await;
    assert!(matches!(outcome, TerminationOutcome::Failed { ref reason } if reason.contains("ghost")));
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn removed_cloud_fails_without_remote_calls() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);
    h.controller.remove_cloud("k8s");
    let before = h.orchestrator.calls().len();

    let outcome = h.controller.terminate(&record.name).await;

    assert!(matches!(outcome, TerminationOutcome::Failed { .. }));
    assert_eq!(h.orchestrator.calls().len(), before);
    assert_eq!(h.status(&record.name), AgentStatus::Failed);
    assert!(listener.contains("FATAL Unable to terminate agent"));
    assert!(listener.contains("Cloud k8s may have been removed"));
}

#[tokio::test]
async fn connect_failure_fails_termination() {
    let h = setup();
    let record = h.provision("t1").await;
    let listener = with_listener(&h, &record.name);
    h.orchestrator.fail_connect(OrchestratorError::Auth("token expired".into()));

    let outcome = h.controller.terminate(&record.name).await;

    assert!(matches!(outcome, TerminationOutcome::Failed { .. }));
    assert_eq!(h.orchestrator.delete_count(), 0);
    assert_eq!(h.status(&record.name), AgentStatus::Failed);
    assert!(listener.contains("FATAL Failed to connect to cloud k8s"));
    assert!(!listener.contains("Disconnected agent"));
}

#[tokio::test]
async fn connected_agent_is_told_to_stop_reconnecting() {
    let h = setup();
    let record = h.provision("t1").await;
    let channel = FakeChannel::new();
    h.controller.attach_channel(&record.name, Arc::new(channel.clone()));

    h.controller.terminate(&record.name).await;

    assert_eq!(channel.sent(), vec![Instruction::StopReconnecting]);
}

#[tokio::test]
async fn detached_channel_is_not_signalled() {
    let h = setup();
    let record = h.provision("t1").await;
    let channel = FakeChannel::new();
    h.controller.attach_channel(&record.name, Arc::new(channel.clone()));
    h.controller.detach_channel(&record.name);

    assert_eq!(h.controller.terminate(&record.name).await, TerminationOutcome::Deleted);
    assert!(channel.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_agent_does_not_block_termination() {
    let h = setup();
    let record = h.provision("t1").await;
    let channel = FakeChannel::new().with_delay(Duration::from_secs(60));
    h.controller.attach_channel(&record.name, Arc::new(channel.clone()));

    let outcome = h.controller.terminate(&record.name).await;

    assert_eq!(outcome, TerminationOutcome::Deleted);
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn channel_error_does_not_block_termination() {
    let h = setup();
    let record = h.provision("t1").await;
    let channel = FakeChannel::new().with_error(TransportError::Closed);
    h.controller.attach_channel(&record.name, Arc::new(channel));

    assert_eq!(h.controller.terminate(&record.name).await, TerminationOutcome::Deleted);
}

#[tokio::test]
async fn restored_agent_resolves_retention_lazily() {
    let h = setup();
    let record = h.provision("keep").await;
    let json = serde_json::to_string(&record).unwrap();

    let fresh = setup();
    fresh.orchestrator.insert_pod(NS, pods::pod(&record.name));
    fresh.controller.restore([serde_json::from_str::<AgentRecord>(&json).unwrap()]);

    let outcome = fresh.controller.terminate(&record.name).await;
    assert_eq!(outcome, TerminationOutcome::Retained { policy: RetentionPolicy::NeverDelete });
}

#[tokio::test]
async fn unresolvable_template_falls_back_to_cloud_retention() {
    let h = setup();
    let record = h.provision("keep").await;
    let json = serde_json::to_string(&record).unwrap();

    let fresh = setup();
    fresh.controller.cloud("k8s").unwrap().templates.remove(&tid("keep"));
    fresh.orchestrator.insert_pod(NS, pods::pod(&record.name));
    fresh.controller.restore([serde_json::from_str::<AgentRecord>(&json).unwrap()]);

    assert_eq!(fresh.controller.terminate(&record.name).await, TerminationOutcome::Deleted);
}

#[test]
fn outcome_display() {
    assert_eq!(TerminationOutcome::Deleted.to_string(), "deleted");
    assert_eq!(
        TerminationOutcome::Retained { policy: RetentionPolicy::NeverDelete }.to_string(),
        "retained (never_delete)"
    );
    assert_eq!(
        TerminationOutcome::Unchanged(AgentStatus::Terminated).to_string(),
        "unchanged (terminated)"
    );
}
