// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

use crate::exit_error::ExitError;

/// Log filter directive: `PW_LOG`, defaulting to `info`
pub fn log_filter() -> String {
    std::env::var("PW_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Resolve the state directory:
/// `--state-dir` > `PW_STATE_DIR` > `XDG_STATE_HOME/podwright` > `~/.local/state/podwright`
pub fn state_dir(explicit: Option<PathBuf>) -> Result<PathBuf, ExitError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = non_empty("PW_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("podwright"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| ExitError::usage("cannot determine a state directory; set PW_STATE_DIR"))?;
    Ok(home.join(".local/state/podwright"))
}

/// Configuration file: `--config` (which also reads `PW_CONFIG`), else
/// `podwright.toml` in the current directory.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from("podwright.toml"))
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
