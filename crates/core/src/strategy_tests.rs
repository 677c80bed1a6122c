// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const MIN: u64 = 60_000;

#[yare::parameterized(
    zero_is_once = { 0,  5, AgentStrategy::Once { timeout_minutes: 5 } },
    custom_once  = { 0, 12, AgentStrategy::Once { timeout_minutes: 12 } },
    idle         = { 30, 5, AgentStrategy::Idle { idle_minutes: 30 } },
)]
fn strategy_from_idle_minutes(idle: u32, timeout: u32, expected: AgentStrategy) {
    assert_eq!(AgentStrategy::for_idle_minutes(idle, timeout), expected);
}

#[test]
fn only_idle_strategy_is_reusable() {
    assert!(AgentStrategy::Idle { idle_minutes: 1 }.is_reusable());
    assert!(!AgentStrategy::Once { timeout_minutes: 1 }.is_reusable());
}

#[yare::parameterized(
    busy_never_expires     = { AgentStrategy::Idle { idle_minutes: 1 },    true,  true,  100 * MIN, false },
    idle_inside_window     = { AgentStrategy::Idle { idle_minutes: 10 },   false, true,  9 * MIN,   false },
    idle_window_elapsed    = { AgentStrategy::Idle { idle_minutes: 10 },   false, true,  10 * MIN,  true },
    once_used_and_done     = { AgentStrategy::Once { timeout_minutes: 5 }, false, false, 0,         true },
    once_unused_fresh      = { AgentStrategy::Once { timeout_minutes: 5 }, false, true,  4 * MIN,   false },
    once_unused_timed_out  = { AgentStrategy::Once { timeout_minutes: 5 }, false, true,  5 * MIN,   true },
    once_busy              = { AgentStrategy::Once { timeout_minutes: 5 }, true,  false, 60 * MIN,  false },
)]
fn expiry(strategy: AgentStrategy, busy: bool, accepting: bool, elapsed_ms: u64, expected: bool) {
    let last_active = 1_000_000;
    assert_eq!(strategy.is_expired(busy, accepting, last_active, last_active + elapsed_ms), expected);
}

#[test]
fn strategy_serializes_with_kind_tag() {
    let json = serde_json::to_string(&AgentStrategy::Idle { idle_minutes: 3 }).unwrap();
    assert_eq!(json, r#"{"kind":"idle","idle_minutes":3}"#);
}
