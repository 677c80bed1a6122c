// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations on the same agent interleaving at their remote calls.

use super::*;
use tokio::task::yield_now;

#[tokio::test]
async fn terminate_during_provision_deletes_the_late_pod() {
    let h = setup();
    let gate = h.orchestrator.hold_creates();

    let t1 = tid("t1");
    let provision = h.controller.provision("k8s", &t1);
    let terminate = async {
        while h.orchestrator.create_count() == 0 {
            yield_now().await;
        }
        let name = h.controller.snapshot()[0].name.clone();
        let outcome = h.controller.terminate(&name).await;
        gate.notify_one();
        (name, outcome)
    };
    let (provisioned, (name, outcome)) = tokio::join!(provision, terminate);

    assert_eq!(outcome, TerminationOutcome::AlreadyGone);
    assert!(
        matches!(provisioned, Err(EngineError::Abandoned { status: AgentStatus::Terminated, .. })),
        "{:?}",
        provisioned
    );
    assert_eq!(h.status(&name), AgentStatus::Terminated);
    assert!(h.controller.record(&name).unwrap().pod().is_none());
    assert_eq!(h.orchestrator.pod_count(), 0);
    assert_eq!(h.orchestrator.delete_count(), 2);
    assert!(h.store.get(&name).is_none());
}

#[tokio::test]
async fn refresh_during_termination_finds_pod_gone() {
    let h = setup_with(cloud_config().garbage_collection(GarbageCollection { timeout_secs: 300 }));
    let record = h.provision("t2").await;
    let gate = h.orchestrator.hold_deletes();

    let terminate = h.controller.terminate(&record.name);
    let refresh = async {
        while h.orchestrator.delete_count() == 0 {
            yield_now().await;
        }
        let outcome = h.controller.refresh_ttl(&record.name).await;
        gate.notify_one();
        outcome
    };
    let (terminated, refreshed) = tokio::join!(terminate, refresh);

    assert_eq!(refreshed, RefreshOutcome::PodGone);
    assert_eq!(terminated, TerminationOutcome::Deleted);
    assert_eq!(h.status(&record.name), AgentStatus::Terminated);
    assert_eq!(h.orchestrator.pod_count(), 0);
    assert!(h.store.get(&record.name).is_none());
}

#[tokio::test]
async fn second_terminate_while_first_in_flight_is_unchanged() {
    let h = setup();
    let record = h.provision("t1").await;
    let gate = h.orchestrator.hold_deletes();

    let first = h.controller.terminate(&record.name);
    let second = async {
        while h.orchestrator.delete_count() == 0 {
            yield_now().await;
        }
        let outcome = h.controller.terminate(&record.name).await;
        gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, TerminationOutcome::Deleted);
    assert_eq!(second, TerminationOutcome::Unchanged(AgentStatus::Disconnecting));
    assert_eq!(h.orchestrator.delete_count(), 1);
}

#[tokio::test]
async fn independent_agents_provision_concurrently() {
    let h = setup();

    let t1 = tid("t1");
    let maven = tid("maven");
    let (a, b) = tokio::join!(
        h.controller.provision("k8s", &t1),
        h.controller.provision("k8s", &maven),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.name, b.name);
    assert_eq!(h.status(&a.name), AgentStatus::Bound);
    assert_eq!(h.status(&b.name), AgentStatus::Bound);
    assert_eq!(h.orchestrator.pod_count(), 2);
}
