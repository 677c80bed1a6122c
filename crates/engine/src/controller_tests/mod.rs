// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller tests against the fake orchestrator and an in-memory store.

mod concurrency;
mod provision;
mod refresh;
mod terminate;

use super::*;
use crate::listener::BufferListener;
use pw_adapters::{FakeChannel, FakeOrchestrator, OrchestratorError, TransportError};
use pw_core::test_support::{jnlp_template, pods};
use pw_core::{
    AgentStatus, CloudConfig, ContainerSpec, FakeClock, GarbageCollection, RetentionPolicy,
    Template, TemplateId,
};
use pw_storage::MemoryStore;
use std::time::Duration;

const NS: &str = "ci";

struct Harness {
    controller: LifecycleController<FakeClock>,
    orchestrator: FakeOrchestrator,
    store: MemoryStore,
    clock: FakeClock,
}

fn tid(id: &str) -> TemplateId {
    TemplateId::from(id)
}

fn cloud_config() -> CloudConfig {
    CloudConfig::new("k8s").namespace(NS)
}

fn templates() -> Vec<Template> {
    vec![
        Template::new(tid("base"), "base").containers(vec![ContainerSpec {
            working_dir: "/home/jenkins".into(),
            ..ContainerSpec::new("jnlp", "agent:4")
        }]),
        Template::new(tid("maven"), "maven")
            .inherit_from(vec![tid("base")])
            .containers(vec![ContainerSpec::new("build", "maven:3")]),
        jnlp_template("t1").idle_minutes(0u32),
        jnlp_template("t2").idle_minutes(30u32),
        jnlp_template("keep").retention(RetentionPolicy::NeverDelete),
        jnlp_template("careful").retention(RetentionPolicy::RetainOnFailure),
        jnlp_template("idle").retention(RetentionPolicy::DeleteIfIdleAfter { after_secs: 600 }),
        jnlp_template("raw").show_raw_yaml(true),
        jnlp_template("elsewhere").namespace("team-a"),
        jnlp_template("loop-a").inherit_from(vec![tid("loop-b")]),
        jnlp_template("loop-b").inherit_from(vec![tid("loop-a")]),
    ]
}

fn setup() -> Harness {
    setup_with(cloud_config())
}

fn setup_with(config: CloudConfig) -> Harness {
    let orchestrator = FakeOrchestrator::new();
    let store = MemoryStore::new();
    let clock = FakeClock::new();
    let controller =
        LifecycleController::new(Arc::new(orchestrator.clone()), Arc::new(store.clone()), clock.clone());
    controller.add_cloud(Cloud::new(config, TemplateRegistry::from_templates(templates())));
    Harness { controller, orchestrator, store, clock }
}

impl Harness {
    async fn provision(&self, template: &str) -> AgentRecord {
        self.controller.provision("k8s", &tid(template)).await.unwrap()
    }

    fn status(&self, name: &AgentName) -> AgentStatus {
        self.controller.record(name).unwrap().status
    }
}

fn with_listener(h: &Harness, name: &AgentName) -> Arc<BufferListener> {
    let listener = Arc::new(BufferListener::new());
    h.controller.attach_listener(name, listener.clone());
    listener
}
