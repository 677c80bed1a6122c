// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_past_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.epoch_ms();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.epoch_ms() - t1, 60_000);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.epoch_ms();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.epoch_ms() - t1, 30_000);
}

#[test]
fn now_utc_matches_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000);
    assert_eq!(clock.now_utc().timestamp_millis(), 1_000);
}
