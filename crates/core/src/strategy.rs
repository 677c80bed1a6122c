// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent reuse strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long an agent lives once it has no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentStrategy {
    /// Single use. The agent stops accepting work once its first task starts,
    /// and is reclaimed if it is never used within `timeout_minutes`.
    Once { timeout_minutes: u32 },
    /// Reusable. The agent is reclaimed after `idle_minutes` without a task.
    Idle { idle_minutes: u32 },
}

impl fmt::Display for AgentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once { timeout_minutes } => write!(f, "once (unused timeout {}m)", timeout_minutes),
            Self::Idle { idle_minutes } => write!(f, "idle ({}m)", idle_minutes),
        }
    }
}

impl AgentStrategy {
    /// Strategy for a template idle timeout; `0` means single use.
    pub fn for_idle_minutes(idle_minutes: u32, retention_timeout_minutes: u32) -> Self {
        if idle_minutes == 0 {
            Self::Once { timeout_minutes: retention_timeout_minutes }
        } else {
            Self::Idle { idle_minutes }
        }
    }

    pub fn is_reusable(&self) -> bool {
        matches!(self, Self::Idle { .. })
    }

    /// Window of inactivity after which an idle agent is reclaimed.
    pub fn idle_window_ms(&self) -> u64 {
        let minutes = match self {
            Self::Once { timeout_minutes } => *timeout_minutes,
            Self::Idle { idle_minutes } => *idle_minutes,
        };
        u64::from(minutes) * 60_000
    }

    /// Whether an agent last active at `last_active_ms` may still take a task.
    pub fn within_window(&self, last_active_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(last_active_ms) < self.idle_window_ms()
    }

    /// Whether an agent in this state should be terminated now.
    pub fn is_expired(&self, busy: bool, accepting_tasks: bool, last_active_ms: u64, now_ms: u64) -> bool {
        if busy {
            return false;
        }
        match self {
            Self::Once { .. } => !accepting_tasks || !self.within_window(last_active_ms, now_ms),
            Self::Idle { .. } => !self.within_window(last_active_ms, now_ms),
        }
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
