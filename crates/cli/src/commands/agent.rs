// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pw provision`, `pw terminate`, `pw refresh-ttl`, `pw agents`

use std::sync::Arc;

use anyhow::Result;
use pw_core::{AgentName, AgentRecord, Clock, SystemClock, TemplateId};
use pw_engine::RefreshOutcome;
use serde::Serialize;

use crate::color;
use crate::context::Context;
use crate::exit_error::ExitError;
use crate::listener::PrintListener;
use crate::output::{format_or_json, format_time_ago, print_json, render_table, OutputFormat};

#[derive(Serialize)]
struct OutcomeRow {
    agent: String,
    outcome: String,
    success: bool,
}

pub async fn provision(
    ctx: &Context,
    cloud: Option<&str>,
    template: &str,
    format: OutputFormat,
) -> Result<()> {
    let cloud = ctx.cloud_name(cloud)?;
    let record = ctx.controller.provision(&cloud, &TemplateId::from(template)).await?;
    match format {
        OutputFormat::Text => {
            ctx.controller.announce_launch(&record.name, "pw", &PrintListener)?;
            println!("Provisioned agent {}", record.qualified_name());
            Ok(())
        }
        OutputFormat::Json => print_json(&record),
    }
}

pub async fn terminate(
    ctx: &Context,
    names: Vec<String>,
    expired: bool,
    format: OutputFormat,
) -> Result<()> {
    let names: Vec<AgentName> = if expired {
        ctx.controller.expired_agents()
    } else {
        names.into_iter().map(AgentName::from).collect()
    };

    let mut rows = Vec::new();
    for name in names {
        ctx.controller.attach_listener(&name, Arc::new(PrintListener));
        let outcome = ctx.controller.terminate(&name).await;
        rows.push(OutcomeRow {
            agent: name.to_string(),
            outcome: outcome.to_string(),
            success: outcome.is_success(),
        });
    }
    report(rows, format)
}

pub async fn refresh_ttl(
    ctx: &Context,
    names: Vec<String>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let names: Vec<AgentName> = if all {
        ctx.controller
            .snapshot()
            .into_iter()
            .filter(|r| !r.status.is_terminal())
            .map(|r| r.name)
            .collect()
    } else {
        names.into_iter().map(AgentName::from).collect()
    };

    let mut rows = Vec::new();
    for name in names {
        let outcome = ctx.controller.refresh_ttl(&name).await;
        let (text, success) = match outcome {
            RefreshOutcome::Refreshed { at_ms } => (format!("refreshed at {}", at_ms), true),
            RefreshOutcome::Disabled => ("garbage collection disabled".to_string(), true),
            RefreshOutcome::PodGone => ("pod gone".to_string(), true),
            RefreshOutcome::Skipped { reason } => (format!("skipped: {}", reason), false),
        };
        rows.push(OutcomeRow { agent: name.to_string(), outcome: text, success });
    }
    report(rows, format)
}

fn report(rows: Vec<OutcomeRow>, format: OutputFormat) -> Result<()> {
    let failed = rows.iter().filter(|r| !r.success).count();
    format_or_json(format, &rows, || {
        if rows.is_empty() {
            return "No agents".to_string();
        }
        rows.iter().map(|r| format!("{}: {}", r.agent, r.outcome)).collect::<Vec<_>>().join("\n")
    })?;
    if failed > 0 {
        return Err(ExitError::failure(format!("{} of {} agent(s) failed", failed, rows.len())).into());
    }
    Ok(())
}

pub fn list(ctx: &Context, expired: bool, format: OutputFormat) -> Result<()> {
    let mut records = ctx.controller.snapshot();
    if expired {
        let expired = ctx.controller.expired_agents();
        records.retain(|r| expired.contains(&r.name));
    }
    format_or_json(format, &records, || table(&records, SystemClock.epoch_ms()))
}

fn table(records: &[AgentRecord], now_ms: u64) -> String {
    if records.is_empty() {
        return "No agents".to_string();
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.name.to_string(),
                r.status.to_string(),
                r.template_id.to_string(),
                r.namespace.clone(),
                r.strategy.to_string(),
                format_time_ago(r.created_at_ms, now_ms),
                format_time_ago(r.last_active_ms, now_ms),
            ]
        })
        .collect();
    render_table(
        &["NAME", "STATUS", "TEMPLATE", "NAMESPACE", "STRATEGY", "AGE", "ACTIVE"],
        &rows,
        |column, cell| {
            let status = records.iter().map(|r| r.status).find(|s| s.to_string() == cell);
            match status {
                Some(status) if column == 1 => color::status(status),
                _ => cell.to_string(),
            }
        },
    )
}
