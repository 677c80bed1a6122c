// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pw resolve` and `pw render` - Inspect templates without touching a cluster

use anyhow::Result;
use pw_adapters::build_pod;
use pw_core::{generate_name, CloudSpec, Config, Template, TemplateId};

use crate::context::select_cloud;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, print_json, OutputFormat};

fn resolve_in(spec: &CloudSpec, template: &str) -> Result<(Template, Vec<TemplateId>), ExitError> {
    let registry = spec.registry();
    let id = TemplateId::from(template);
    let failed = |e: pw_core::TemplateError| ExitError::failure(e.to_string());
    let chain = registry.chain(&id).map_err(failed)?;
    let resolved = registry.resolve(&id).map_err(failed)?;
    Ok((resolved, chain.iter().map(|t| t.id.clone()).collect()))
}

/// Print a template merged with all of its ancestors.
pub fn resolve(config: &Config, cloud: Option<&str>, template: &str, format: OutputFormat) -> Result<()> {
    let spec = select_cloud(config, cloud)?;
    let (resolved, chain) = resolve_in(spec, template)?;
    format_or_json(format, &resolved, || describe(&resolved, &chain, spec))
}

/// Print the pod manifest an agent of `template` would be created with.
pub fn render(
    config: &Config,
    cloud: Option<&str>,
    template: &str,
    name: Option<&str>,
) -> Result<()> {
    let spec = select_cloud(config, cloud)?;
    let (resolved, _) = resolve_in(spec, template)?;
    let name = match name {
        Some(name) => name.to_string(),
        None => generate_name(&resolved.name),
    };
    let namespace = spec.cloud.namespace_for(&resolved.namespace);
    print_json(&build_pod(&resolved, &spec.cloud, &name, namespace))
}

fn describe(template: &Template, chain: &[TemplateId], spec: &CloudSpec) -> String {
    let chain: Vec<&str> = chain.iter().map(|id| id.as_str()).collect();
    let mut lines = vec![
        format!("id:         {}", template.id),
        format!("name:       {}", template.name),
        format!("chain:      {}", chain.join(" -> ")),
        format!("namespace:  {}", spec.cloud.namespace_for(&template.namespace)),
        format!(
            "strategy:   {}",
            template.strategy(spec.cloud.retention_timeout_minutes)
        ),
        format!(
            "retention:  {}",
            template.retention.as_ref().map_or_else(|| "cloud default".to_string(), |r| r.to_string())
        ),
    ];
    if !template.label.is_empty() {
        lines.push(format!("label:      {}", template.label));
    }
    for container in &template.containers {
        let mut line = format!("container:  {} {}", container.name, container.image);
        if !container.working_dir.is_empty() {
            line.push_str(&format!(" ({})", container.working_dir));
        }
        lines.push(line);
    }
    for volume in &template.volumes {
        lines.push(format!("volume:     {}", volume.mount_path));
    }
    lines.join("\n")
}
