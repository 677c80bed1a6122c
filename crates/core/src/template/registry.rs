// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Id-keyed template registry.
//!
//! Templates are published as `Arc<Template>` and never mutated in place:
//! editing a template means replacing its entry, so a resolution that already
//! holds the old `Arc` keeps a consistent view.

use super::resolve::resolve_chain;
use super::{Template, TemplateError, TemplateId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: RwLock<IndexMap<TemplateId, Arc<Template>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let registry = Self::new();
        for template in templates {
            registry.add(template);
        }
        registry
    }

    /// Publish a template, replacing any entry with the same id in place.
    pub fn add(&self, template: Template) {
        self.templates.write().insert(template.id.clone(), Arc::new(template));
    }

    /// Replace `old` with `new`, keeping its position.
    ///
    /// Returns `false` (and changes nothing) when `old` is not registered or
    /// when `new` would take the id of a different registered template.
    pub fn replace(&self, old: &TemplateId, new: Template) -> bool {
        let mut templates = self.templates.write();
        if !templates.contains_key(old) || (&new.id != old && templates.contains_key(&new.id)) {
            return false;
        }
        let new = Arc::new(new);
        *templates = std::mem::take(&mut *templates)
            .into_iter()
            .map(|(id, t)| if &id == old { (new.id.clone(), Arc::clone(&new)) } else { (id, t) })
            .collect();
        true
    }

    pub fn remove(&self, id: &TemplateId) -> Option<Arc<Template>> {
        self.templates.write().shift_remove(id)
    }

    pub fn lookup_by_id(&self, id: &TemplateId) -> Option<Arc<Template>> {
        self.templates.read().get(id).cloned()
    }

    /// All templates in registration order.
    pub fn templates(&self) -> Vec<Arc<Template>> {
        self.templates.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Build the explicit inheritance chain for `id`, most generic first.
    ///
    /// Parents are walked depth-first in declared order, each parent's own
    /// ancestors before it. A walk that reaches any id a second time is
    /// rejected, so cycles can never be resolved.
    pub fn chain(&self, id: &TemplateId) -> Result<Vec<Arc<Template>>, TemplateError> {
        let templates = self.templates.read();
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        walk(&templates, id, &mut visited, &mut chain)?;
        Ok(chain)
    }

    /// Resolve `id` into its effective template.
    pub fn resolve(&self, id: &TemplateId) -> Result<Template, TemplateError> {
        let chain = self.chain(id)?;
        resolve_chain(&chain).ok_or_else(|| TemplateError::NotFound(id.clone()))
    }
}

fn walk(
    templates: &IndexMap<TemplateId, Arc<Template>>,
    id: &TemplateId,
    visited: &mut HashSet<TemplateId>,
    chain: &mut Vec<Arc<Template>>,
) -> Result<(), TemplateError> {
    if !visited.insert(id.clone()) {
        return Err(TemplateError::InheritanceCycle(id.clone()));
    }
    let template = templates.get(id).cloned().ok_or_else(|| TemplateError::NotFound(id.clone()))?;
    for parent in &template.inherit_from {
        walk(templates, parent, visited, chain)?;
    }
    chain.push(template);
    Ok(())
}
