// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Compact elapsed time: `45s`, `12m`, `3h`, `2d`.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Age of `epoch_ms` relative to `now_ms`; `-` for an unset timestamp.
pub fn format_time_ago(epoch_ms: u64, now_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    format_elapsed(now_ms.saturating_sub(epoch_ms) / 1000)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `text` or the JSON form of `value`, depending on `format`.
pub fn format_or_json<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", text());
            Ok(())
        }
        OutputFormat::Json => print_json(value),
    }
}

/// Left-aligned columns separated by two spaces.
///
/// Widths are computed from the visible text, so cells must not contain
/// ANSI escapes; pass a `decorate` function to color cells after padding.
pub fn render_table(
    headers: &[&str],
    rows: &[Vec<String>],
    decorate: impl Fn(usize, &str) -> String,
) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String], paint: &dyn Fn(usize, &str) -> String| -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = if i == last {
                    0
                } else {
                    widths.get(i).copied().unwrap_or(0).saturating_sub(cell.chars().count())
                };
                format!("{}{}", paint(i, cell), " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = vec![line(&headers, &|_, h| crate::color::header(h))];
    for row in rows {
        out.push(line(row, &decorate));
    }
    out.join("\n")
}
