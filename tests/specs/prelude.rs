// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers: a fluent wrapper over `assert_cmd` and a temp project.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

pub const CONFIG: &str = r#"
[[cloud]]
name = "k8s"
namespace = "ci"

[[cloud.template]]
id = "base"
name = "base"
labels = { team = "infra" }

[[cloud.template.container]]
name = "jnlp"
image = "agent:4"
working_dir = "/home/jenkins"

[[cloud.template]]
id = "maven"
name = "Maven Build"
idle_minutes = 30
retention = "never_delete"
inherit_from = ["base"]

[[cloud.template.container]]
name = "build"
image = "maven:3"

[[cloud.template]]
id = "loop-a"
inherit_from = ["loop-b"]

[[cloud.template]]
id = "loop-b"
inherit_from = ["loop-a"]
"#;

pub fn cli() -> Cli {
    let mut cmd = Command::cargo_bin("pw").unwrap();
    cmd.env("NO_COLOR", "1").env("PW_LOG", "warn").env_remove("PW_CONFIG").env_remove("PW_STATE_DIR");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert_eq!(out.code, 0, "expected success\nstdout:\n{}\nstderr:\n{}", out.stdout, out.stderr);
        out
    }

    pub fn fails_with(mut self, code: i32) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert_eq!(out.code, code, "unexpected exit\nstdout:\n{}\nstderr:\n{}", out.stdout, out.stderr);
        out
    }
}

pub struct Output {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {:?}:\n{}", needle, self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {:?}:\n{}", needle, self.stderr);
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}

/// A temp directory holding `podwright.toml` and a state directory.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self { dir: tempfile::tempdir().unwrap() };
        project.file("podwright.toml", CONFIG);
        project
    }

    pub fn file(&self, rel: &str, contents: &str) {
        std::fs::write(self.path().join(rel), contents).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    /// `pw` with `--config` and `--state-dir` pointing into this project
    pub fn pw(&self, args: &[&str]) -> Cli {
        let config = self.path().join("podwright.toml");
        let state = self.state_dir();
        cli()
            .args(&["--config", config.to_str().unwrap(), "--state-dir", state.to_str().unwrap()])
            .args(args)
    }
}
