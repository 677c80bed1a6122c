// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn force_color() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
}

fn disable_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn styles_are_plain_without_color() {
    disable_color();
    assert_eq!(format!("{:?}", styles()), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn styles_are_styled_when_forced() {
    force_color();
    assert_ne!(format!("{:?}", styles()), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn header_wraps_in_ansi_when_forced() {
    force_color();
    let result = header("AGENTS");
    assert!(result.starts_with("\x1b[38;5;74m"));
    assert!(result.ends_with("\x1b[0m"));
}

#[test]
#[serial]
fn no_color_wins_over_color() {
    std::env::set_var("COLOR", "1");
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(header("AGENTS"), "AGENTS");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn status_colors_by_outcome() {
    force_color();
    assert!(status(AgentStatus::Bound).contains("\x1b[38;5;114m"));
    assert!(status(AgentStatus::Failed).contains("\x1b[38;5;203m"));
    assert_eq!(status(AgentStatus::Provisioning), "provisioning");

    disable_color();
    assert_eq!(status(AgentStatus::Failed), "failed");
}
