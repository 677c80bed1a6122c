//! `pw resolve` and `pw render` specs

use crate::prelude::*;

#[test]
fn resolve_shows_merged_chain() {
    let project = Project::new();
    project
        .pw(&["resolve", "maven"])
        .passes()
        .stdout_has("chain:      base -> maven")
        .stdout_has("namespace:  ci")
        .stdout_has("container:  jnlp agent:4 (/home/jenkins)")
        .stdout_has("container:  build maven:3")
        .stdout_has("retention:  never_delete");
}

#[test]
fn resolve_as_json() {
    let project = Project::new();
    let out = project.pw(&["-o", "json", "resolve", "maven"]).passes();
    let template = out.json();

    assert_eq!(template["id"], "maven");
    assert_eq!(template["idle_minutes"], 30);
    assert_eq!(template["labels"]["team"], "infra");
    let containers: Vec<_> = template["container"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    similar_asserts::assert_eq!(containers, vec!["jnlp", "build"]);
    assert!(template.get("inherit_from").is_none());
}

#[test]
fn resolve_unknown_template_fails() {
    let project = Project::new();
    project.pw(&["resolve", "gradle"]).fails_with(1).stderr_has("template not found: gradle");
}

#[test]
fn resolve_cycle_fails() {
    let project = Project::new();
    project.pw(&["resolve", "loop-a"]).fails_with(1).stderr_has("twice");
}

#[test]
fn resolve_unknown_cloud_is_usage_error() {
    let project = Project::new();
    project.pw(&["resolve", "maven", "--cloud", "gke"]).fails_with(2).stderr_has("unknown cloud gke");
}

#[test]
fn missing_config_is_usage_error() {
    cli()
        .args(&["--config", "/nonexistent/podwright.toml", "resolve", "maven"])
        .fails_with(2)
        .stderr_has("failed to read");
}

#[test]
fn config_from_environment() {
    let project = Project::new();
    let config = project.path().join("podwright.toml");
    cli()
        .args(&["resolve", "base"])
        .env("PW_CONFIG", config.to_str().unwrap())
        .passes()
        .stdout_has("id:         base");
}

#[test]
fn render_builds_pod_manifest() {
    let project = Project::new();
    let out = project.pw(&["render", "maven", "--name", "maven-abcde"]).passes();
    let pod = out.json();

    assert_eq!(pod["metadata"]["name"], "maven-abcde");
    assert_eq!(pod["metadata"]["namespace"], "ci");
    assert_eq!(pod["metadata"]["labels"]["podwright.io/agent"], "maven-abcde");
    assert_eq!(pod["metadata"]["labels"]["team"], "infra");
    assert_eq!(pod["metadata"]["labels"]["app"], "podwright-agent");
    assert_eq!(pod["spec"]["restartPolicy"], "Never");
    assert_eq!(pod["spec"]["containers"][0]["workingDir"], "/home/jenkins");
    assert_eq!(pod["spec"]["containers"][1]["workingDir"], "/home/agent");
}

#[test]
fn render_generates_name_from_template() {
    let project = Project::new();
    let out = project.pw(&["render", "maven"]).passes();
    let name = out.json()["metadata"]["name"].as_str().unwrap().to_string();
    assert!(name.starts_with("maven-build-"), "{}", name);
}
