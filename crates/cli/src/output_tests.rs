// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

#[parameterized(
    zero = { 0, "0s" },
    seconds = { 59, "59s" },
    minute = { 60, "1m" },
    minutes = { 3599, "59m" },
    hour = { 3600, "1h" },
    day = { 86_400, "1d" },
    days = { 3 * 86_400 + 5, "3d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[test]
fn time_ago_of_unset_timestamp() {
    assert_eq!(format_time_ago(0, 1_000_000), "-");
}

#[test]
fn time_ago_never_goes_negative() {
    assert_eq!(format_time_ago(2_000, 1_000), "0s");
    assert_eq!(format_time_ago(1_000, 121_000), "2m");
}

#[test]
#[serial]
fn table_aligns_columns() {
    std::env::set_var("NO_COLOR", "1");
    let rows = vec![
        vec!["maven-x7q2b".to_string(), "bound".to_string()],
        vec!["go-a".to_string(), "failed".to_string()],
    ];
    let table = render_table(&["NAME", "STATUS"], &rows, |_, c| c.to_string());
    assert_eq!(
        table,
        "NAME         STATUS\nmaven-x7q2b  bound\ngo-a         failed"
    );
}

#[test]
#[serial]
fn table_pads_by_visible_width() {
    std::env::set_var("NO_COLOR", "1");
    let rows = vec![vec!["a".to_string(), "b".to_string()]];
    let table = render_table(&["ID", "X"], &rows, |i, c| if i == 0 { format!("\x1b[1m{c}\x1b[0m") } else { c.to_string() });
    assert_eq!(table.lines().nth(1), Some("\x1b[1ma\x1b[0m   b"));
}
