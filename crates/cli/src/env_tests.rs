// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    std::env::remove_var("PW_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
    std::env::remove_var("PW_LOG");
}

#[test]
#[serial]
fn explicit_state_dir_wins() {
    clear();
    std::env::set_var("PW_STATE_DIR", "/tmp/from-env");
    let dir = state_dir(Some(PathBuf::from("/tmp/explicit"))).unwrap();
    assert_eq!(dir, PathBuf::from("/tmp/explicit"));
}

#[test]
#[serial]
fn state_dir_from_env() {
    clear();
    std::env::set_var("PW_STATE_DIR", "/tmp/from-env");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir(None).unwrap(), PathBuf::from("/tmp/from-env"));
}

#[test]
#[serial]
fn state_dir_under_xdg() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir(None).unwrap(), PathBuf::from("/tmp/xdg/podwright"));
}

#[test]
#[serial]
fn empty_env_values_are_ignored() {
    clear();
    std::env::set_var("PW_STATE_DIR", "");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir(None).unwrap(), PathBuf::from("/tmp/xdg/podwright"));
}

#[test]
#[serial]
fn state_dir_falls_back_to_home() {
    clear();
    if let Some(home) = dirs::home_dir() {
        assert_eq!(state_dir(None).unwrap(), home.join(".local/state/podwright"));
    }
}

#[test]
#[serial]
fn log_filter_defaults_to_info() {
    clear();
    assert_eq!(log_filter(), "info");
    std::env::set_var("PW_LOG", "pw_engine=debug");
    assert_eq!(log_filter(), "pw_engine=debug");
    clear();
}

#[test]
fn config_path_default() {
    assert_eq!(config_path(None), PathBuf::from("podwright.toml"));
    assert_eq!(config_path(Some(PathBuf::from("/etc/pw.toml"))), PathBuf::from("/etc/pw.toml"));
}
