//! `pw name` specs

use crate::prelude::*;

#[test]
fn name_normalizes_free_text() {
    let out = cli().args(&["name", "My Build_Job"]).passes();
    let name = out.stdout.trim();
    assert!(name.starts_with("my-build-job-"), "{}", name);
    assert_eq!(name.len(), "my-build-job-".len() + 5);
}

#[test]
fn empty_name_uses_default_prefix() {
    let out = cli().args(&["name"]).passes();
    assert!(out.stdout.trim().starts_with("podwright-agent-"), "{}", out.stdout);
}

#[test]
fn long_name_fits_pod_name_limit() {
    let long = "x".repeat(100);
    let out = cli().args(&["name", &long]).passes();
    assert!(out.stdout.trim().len() <= 63);
}

#[test]
fn name_as_json() {
    let out = cli().args(&["-o", "json", "name", "go"]).passes();
    let name = out.json()["name"].as_str().unwrap().to_string();
    assert!(name.starts_with("go-"));
}

#[test]
fn check_accepts_legal_name() {
    cli().args(&["name", "--check", "maven-x7q2b"]).passes().stdout_has("legal");
}

#[test]
fn check_rejects_illegal_name() {
    cli().args(&["name", "--check", "Bad_Name"]).fails_with(1).stdout_has("illegal");
}
