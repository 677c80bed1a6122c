// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_adapters::PodCall;
use pw_core::{AgentStrategy, TemplateError, AGENT_LABEL};

#[tokio::test]
async fn provision_binds_agent_from_merged_template() {
    let h = setup();
    let record = h.provision("maven").await;

    assert_eq!(record.status, AgentStatus::Bound);
    assert!(record.name.starts_with("maven-"), "{}", record.name);
    assert_eq!(record.namespace, NS);
    assert_eq!(record.working_dir(), Some("/home/jenkins"));

    let pod = h.orchestrator.pod(NS, &record.name).unwrap();
    let containers: Vec<_> =
        pod.spec.unwrap().containers.into_iter().map(|c| c.name).collect();
    assert_eq!(containers, vec!["jnlp", "build"]);
    assert_eq!(
        pod.metadata.labels.unwrap().get(AGENT_LABEL).map(String::as_str),
        Some(record.name.as_str())
    );
}

#[tokio::test]
async fn provision_persists_bound_record() {
    let h = setup();
    let record = h.provision("t2").await;

    let stored = h.store.get(&record.name).unwrap();
    assert_eq!(stored.status, AgentStatus::Bound);
    assert_eq!(stored.template_id, tid("t2"));
    assert_eq!(stored.strategy, AgentStrategy::Idle { idle_minutes: 30 });
    assert_eq!(stored.created_at_ms, h.clock.epoch_ms());
}

#[tokio::test]
async fn provision_uses_template_namespace_override() {
    let h = setup();
    let record = h.provision("elsewhere").await;

    assert_eq!(record.namespace, "team-a");
    assert!(h.orchestrator.pod("team-a", &record.name).is_some());
    assert!(h.orchestrator.pod(NS, &record.name).is_none());
}

#[tokio::test]
async fn provision_names_agents_uniquely() {
    let h = setup();
    let a = h.provision("t1").await;
    let b = h.provision("t1").await;

    assert_ne!(a.name, b.name);
    assert_eq!(h.controller.snapshot().len(), 2);
}

#[tokio::test]
async fn provision_unknown_template_creates_nothing() {
    let h = setup();
    let err = h.controller.provision("k8s", &tid("missing")).await.unwrap_err();

    assert!(
        matches!(err, EngineError::Template(TemplateError::NotFound(ref id)) if id == "missing"),
        "{:?}",
        err
    );
    assert!(h.controller.snapshot().is_empty());
    assert!(h.store.is_empty());
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn provision_inheritance_cycle_creates_nothing() {
    let h = setup();
    let err = h.controller.provision("k8s", &tid("loop-a")).await.unwrap_err();

    assert!(matches!(err, EngineError::Template(TemplateError::InheritanceCycle(_))), "{:?}", err);
    assert!(h.controller.snapshot().is_empty());
    assert_eq!(h.orchestrator.connect_count(), 0);
}

#[tokio::test]
async fn provision_unknown_cloud() {
    let h = setup();
    let err = h.controller.provision("gke", &tid("t1")).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownCloud(ref c) if c == "gke"), "{:?}", err);
}

#[tokio::test]
async fn provision_connect_failure_leaves_failed_record() {
    let h = setup();
    h.orchestrator.fail_connect(OrchestratorError::Auth("token expired".into()));

    let err = h.controller.provision("k8s", &tid("t1")).await.unwrap_err();
    assert!(matches!(err, EngineError::Orchestrator(OrchestratorError::Auth(_))), "{:?}", err);

    let records = h.controller.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AgentStatus::Failed);
    assert!(records[0].pod().is_none());
    assert_eq!(h.store.get(&records[0].name).unwrap().status, AgentStatus::Failed);
}

#[tokio::test]
async fn provision_create_failure_leaves_failed_record() {
    let h = setup();
    h.orchestrator.fail_create(OrchestratorError::Api("quota exceeded".into()));

    let err = h.controller.provision("k8s", &tid("t1")).await.unwrap_err();
    assert!(matches!(err, EngineError::Orchestrator(OrchestratorError::Api(_))), "{:?}", err);
    assert_eq!(h.orchestrator.pod_count(), 0);

    let records = h.controller.snapshot();
    assert_eq!(records[0].status, AgentStatus::Failed);
}

#[tokio::test]
async fn failed_provision_can_still_be_terminated() {
    let h = setup();
    h.orchestrator.fail_create(OrchestratorError::Api("quota exceeded".into()));
    let _ = h.controller.provision("k8s", &tid("t1")).await;
    h.orchestrator.clear_failures();

    let name = h.controller.snapshot()[0].name.clone();
    let outcome = h.controller.terminate(&name).await;

    assert_eq!(outcome, TerminationOutcome::AlreadyGone);
    assert_eq!(h.status(&name), AgentStatus::Terminated);
}

#[tokio::test]
async fn single_use_template_is_never_reused() {
    let h = setup();
    let first = h.controller.acquire("k8s", &tid("t1")).await.unwrap();
    h.controller.task_started(&first.name).unwrap();
    h.controller.task_finished(&first.name).unwrap();

    let second = h.controller.acquire("k8s", &tid("t1")).await.unwrap();
    assert_ne!(first.name, second.name);
}

#[tokio::test]
async fn idle_template_is_reused_within_window() {
    let h = setup();
    let first = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    h.controller.task_started(&first.name).unwrap();
    h.controller.task_finished(&first.name).unwrap();
    h.clock.advance(Duration::from_secs(10 * 60));

    let second = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    assert_eq!(first.name, second.name);
    let creates =
        h.orchestrator.calls().into_iter().filter(|c| matches!(c, PodCall::Create { .. })).count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn idle_template_is_not_reused_after_window() {
    let h = setup();
    let first = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    h.clock.advance(Duration::from_secs(30 * 60));

    let second = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    assert_ne!(first.name, second.name);
}

#[tokio::test]
async fn busy_agent_is_not_reused() {
    let h = setup();
    let first = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    h.controller.task_started(&first.name).unwrap();

    let second = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    assert_ne!(first.name, second.name);
}

#[tokio::test]
async fn reuse_is_scoped_to_template() {
    let h = setup();
    let a = h.controller.acquire("k8s", &tid("t2")).await.unwrap();
    let b = h.controller.acquire("k8s", &tid("maven")).await.unwrap();
    assert_ne!(a.name, b.name);
}

#[tokio::test]
async fn task_started_closes_single_use_agent() {
    let h = setup();
    let record = h.provision("t1").await;
    h.clock.advance(Duration::from_secs(5));
    h.controller.task_started(&record.name).unwrap();

    let record = h.controller.record(&record.name).unwrap();
    assert!(record.busy);
    assert!(!record.accepting_tasks);
    assert_eq!(record.last_active_ms, h.clock.epoch_ms());
}

#[tokio::test]
async fn task_started_keeps_idle_agent_open() {
    let h = setup();
    let record = h.provision("t2").await;
    h.controller.task_started(&record.name).unwrap();
    assert!(h.controller.record(&record.name).unwrap().accepting_tasks);
}

#[tokio::test]
async fn task_accounting_rejects_unknown_agent() {
    let h = setup();
    let err = h.controller.task_started(&AgentName::from("ghost")).unwrap_err();
    assert!(matches!(err, EngineError::UnknownAgent(_)));
}

#[tokio::test]
async fn expired_agents_follow_strategy() {
    let h = setup();
    let once = h.provision("t1").await;
    let idle = h.provision("t2").await;
    assert!(h.controller.expired_agents().is_empty());

    h.controller.task_started(&once.name).unwrap();
    h.controller.task_finished(&once.name).unwrap();
    assert_eq!(h.controller.expired_agents(), vec![once.name.clone()]);

    h.clock.advance(Duration::from_secs(30 * 60));
    let mut expected = vec![once.name, idle.name];
    expected.sort();
    assert_eq!(h.controller.expired_agents(), expected);
}

#[tokio::test]
async fn announce_launch_prints_once_per_executable() {
    let h = setup();
    let record = h.provision("maven").await;
    let listener = BufferListener::new();

    assert!(h.controller.announce_launch(&record.name, "build #1", &listener).unwrap());
    assert!(!h.controller.announce_launch(&record.name, "build #1", &listener).unwrap());
    assert!(h.controller.announce_launch(&record.name, "build #2", &listener).unwrap());

    let line = format!("Agent {} is provisioned from template maven", record.name);
    assert_eq!(listener.count(&line), 2);
}

#[tokio::test]
async fn announce_launch_dumps_manifest_when_requested() {
    let h = setup();
    let record = h.provision("raw").await;
    let listener = BufferListener::new();

    h.controller.announce_launch(&record.name, "build #1", &listener).unwrap();
    assert!(listener.contains("\"restartPolicy\": \"Never\""));

    let plain = h.provision("t1").await;
    let quiet = BufferListener::new();
    h.controller.announce_launch(&plain.name, "build #1", &quiet).unwrap();
    assert_eq!(quiet.lines().len(), 1);
}

#[tokio::test]
async fn announce_launch_resolves_template_after_restore() {
    let h = setup();
    let record = h.provision("maven").await;
    let json = serde_json::to_string(&record).unwrap();

    let fresh = setup();
    let restored: AgentRecord = serde_json::from_str(&json).unwrap();
    assert!(restored.cached_template().is_none());
    assert_eq!(fresh.controller.restore([restored]), 1);

    let listener = BufferListener::new();
    assert!(fresh.controller.announce_launch(&record.name, "build #1", &listener).unwrap());
    assert!(listener.contains("is provisioned from template maven"));
    assert!(fresh.controller.record(&record.name).unwrap().cached_template().is_some());
}

#[tokio::test]
async fn announce_launch_reports_unresolvable_template() {
    let h = setup();
    let record = h.provision("t2").await;
    let json = serde_json::to_string(&record).unwrap();

    let fresh = setup();
    fresh.controller.cloud("k8s").unwrap().templates.remove(&tid("t2"));
    fresh.controller.restore([serde_json::from_str::<AgentRecord>(&json).unwrap()]);

    let listener = BufferListener::new();
    let err = fresh.controller.announce_launch(&record.name, "build #1", &listener).unwrap_err();
    assert!(matches!(err, EngineError::Template(TemplateError::Unresolvable(_))), "{:?}", err);
    assert!(listener.contains("ERROR Agent"));
}

#[tokio::test]
async fn restore_skips_known_agents() {
    let h = setup();
    let record = h.provision("t2").await;

    assert_eq!(h.controller.restore([record.clone()]), 0);
    assert_eq!(h.controller.snapshot().len(), 1);
}

#[tokio::test]
async fn restore_from_store_reloads_live_records() {
    let h = setup();
    let a = h.provision("t1").await;
    let b = h.provision("t2").await;
    h.controller.terminate(&a.name).await;

    let fresh = LifecycleController::new(
        Arc::new(h.orchestrator.clone()),
        Arc::new(h.store.clone()),
        h.clock.clone(),
    );
    assert_eq!(fresh.restore_from_store().unwrap(), 1);

    let names: Vec<_> = fresh.snapshot().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec![b.name]);
}

#[tokio::test]
async fn store_failures_do_not_fail_provisioning() {
    let h = setup();
    h.store.fail_writes();

    let record = h.provision("t1").await;
    assert_eq!(record.status, AgentStatus::Bound);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn listener_for_falls_back_to_null() {
    let h = setup();
    let name = AgentName::from("unattached");
    h.controller.listener_for(&name).info("dropped");

    let buffer = Arc::new(BufferListener::new());
    h.controller.attach_listener(&name, buffer.clone());
    h.controller.listener_for(&name).info("kept");
    assert_eq!(buffer.lines(), vec!["INFO kept"]);
}
