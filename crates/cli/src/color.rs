// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use pw_core::AgentStatus;
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders: medium grey
    pub const CONTEXT: u8 = 245;
    pub const GOOD: u8 = 114;
    pub const BAD: u8 = 203;
    pub const MUTED: u8 = 240;
}

/// Whether to emit ANSI colors.
///
/// `NO_COLOR=1` disables, then `COLOR=1` forces, then the TTY decides.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// clap `Styles` in the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Status text colored by how the agent is doing.
pub fn status(status: AgentStatus) -> String {
    let text = status.to_string();
    match status {
        AgentStatus::Bound => paint(codes::GOOD, &text),
        AgentStatus::Failed => paint(codes::BAD, &text),
        AgentStatus::Terminated | AgentStatus::Retained => paint(codes::MUTED, &text),
        AgentStatus::Provisioning | AgentStatus::Disconnecting => text,
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
