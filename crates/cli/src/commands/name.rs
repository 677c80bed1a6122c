// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pw name` - Generate an agent name

use anyhow::Result;
use pw_core::{generate_name, is_legal_name};

use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

pub fn handle(text: &[String], check: bool, format: OutputFormat) -> Result<()> {
    let text = text.join(" ");
    if check {
        let legal = is_legal_name(&text);
        format_or_json(format, &serde_json::json!({ "name": text, "legal": legal }), || {
            format!("{}: {}", text, if legal { "legal" } else { "illegal" })
        })?;
        if !legal {
            return Err(ExitError::failure(format!("{} is not a legal pod name", text)).into());
        }
        return Ok(());
    }

    let name = generate_name(&text);
    format_or_json(format, &serde_json::json!({ "name": name }), || name.clone())
}
