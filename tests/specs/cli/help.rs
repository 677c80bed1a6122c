//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("resolve")
        .stdout_has("render")
        .stdout_has("provision")
        .stdout_has("terminate")
        .stdout_has("refresh-ttl")
        .stdout_has("agents");
}

#[test]
fn no_args_is_a_usage_error() {
    cli().fails_with(2).stderr_has("Usage:");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn terminate_rejects_names_with_expired() {
    cli().args(&["terminate", "a", "--expired"]).fails_with(2);
}
