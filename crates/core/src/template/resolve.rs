// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template composition.
//!
//! The override rule is the same at every level: a value the child sets wins,
//! a value the child leaves unset is inherited from the parent unchanged.
//! Keyed lists are folded entry by entry so that `combine` is associative and
//! a chain can be resolved by a plain left fold.

use super::{ContainerSpec, Template, VolumeSpec};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Merge `child` over `parent`.
///
/// The result carries the child's id and no `inherit_from`: it is an
/// effective template, not a fragment. Neither input is modified.
pub fn combine(parent: &Template, child: &Template) -> Template {
    Template {
        id: child.id.clone(),
        name: pick_str(&parent.name, &child.name),
        label: pick_str(&parent.label, &child.label),
        node_usage_mode: child.node_usage_mode.or(parent.node_usage_mode),
        namespace: pick_str(&parent.namespace, &child.namespace),
        containers: merge_keyed(
            &parent.containers,
            &child.containers,
            |c| &c.name,
            combine_containers,
        ),
        volumes: merge_keyed(&parent.volumes, &child.volumes, |v| &v.mount_path, combine_volumes),
        idle_minutes: child.idle_minutes.or(parent.idle_minutes),
        retention: child.retention.clone().or_else(|| parent.retention.clone()),
        show_raw_yaml: child.show_raw_yaml.or(parent.show_raw_yaml),
        labels: merge_maps(&parent.labels, &child.labels),
        annotations: merge_maps(&parent.annotations, &child.annotations),
        inherit_from: Vec::new(),
    }
}

/// Fold an explicit chain, most generic ancestor first.
///
/// Returns `None` for an empty chain.
pub fn resolve_chain(chain: &[Arc<Template>]) -> Option<Template> {
    let (first, rest) = chain.split_first()?;
    let seed = Template { inherit_from: Vec::new(), ..Template::clone(first) };
    Some(rest.iter().fold(seed, |acc, t| combine(&acc, t)))
}

pub(super) fn combine_containers(parent: &ContainerSpec, child: &ContainerSpec) -> ContainerSpec {
    ContainerSpec {
        name: child.name.clone(),
        image: pick_str(&parent.image, &child.image),
        working_dir: pick_str(&parent.working_dir, &child.working_dir),
        command: pick_vec(&parent.command, &child.command),
        args: pick_vec(&parent.args, &child.args),
        tty: child.tty.or(parent.tty),
        env: merge_maps(&parent.env, &child.env),
    }
}

fn combine_volumes(_parent: &VolumeSpec, child: &VolumeSpec) -> VolumeSpec {
    // The source is a single typed value; a child redefining the mount path
    // replaces it whole.
    child.clone()
}

fn pick_str(parent: &str, child: &str) -> String {
    if child.is_empty() { parent } else { child }.to_string()
}

fn pick_vec(parent: &[String], child: &[String]) -> Vec<String> {
    if child.is_empty() { parent } else { child }.to_vec()
}

fn merge_maps(
    parent: &BTreeMap<String, String>,
    child: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = parent.clone();
    merged.extend(child.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Fold `parent` then `child` entries into one list keyed by `key`.
///
/// First occurrence fixes the position; later occurrences of the same key are
/// merged into it. Duplicates inside a single fragment therefore collapse too.
fn merge_keyed<T: Clone>(
    parent: &[T],
    child: &[T],
    key: impl Fn(&T) -> &String,
    merge: impl Fn(&T, &T) -> T,
) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(parent.len() + child.len());
    for item in parent.iter().chain(child) {
        match merged.iter().position(|m| key(m) == key(item)) {
            Some(i) => merged[i] = merge(&merged[i], item),
            None => merged.push(item.clone()),
        }
    }
    merged
}
