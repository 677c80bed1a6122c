//! `pw agents`, `pw terminate`, and `pw refresh-ttl` specs that need no cluster

use crate::prelude::*;

#[test]
fn agents_empty_state() {
    let project = Project::new();
    project.pw(&["agents"]).passes().stdout_has("No agents");
    assert!(project.state_dir().join("templates/k8s.json").exists());
}

#[test]
fn agents_json_is_an_array() {
    let project = Project::new();
    let out = project.pw(&["-o", "json", "agents"]).passes();
    assert_eq!(out.json(), serde_json::json!([]));
}

#[test]
fn terminate_unknown_agent_fails() {
    let project = Project::new();
    project
        .pw(&["terminate", "ghost-abcde"])
        .fails_with(1)
        .stdout_has("ghost-abcde: failed: unknown agent ghost-abcde");
}

#[test]
fn terminate_expired_with_nothing_expired() {
    let project = Project::new();
    project.pw(&["terminate", "--expired"]).passes().stdout_has("No agents");
}

#[test]
fn refresh_unknown_agent_is_skipped() {
    let project = Project::new();
    project.pw(&["refresh-ttl", "ghost-abcde"]).fails_with(1).stdout_has("skipped");
}

#[test]
fn refresh_all_with_no_agents() {
    let project = Project::new();
    project.pw(&["refresh-ttl", "--all"]).passes().stdout_has("No agents");
}
