// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Identifier of a template, unique within one registry.
///
/// Operators choose ids in configuration. A template declared without one
/// gets a random `tpl-` id so it can still be registered, though nothing can
/// inherit from it by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(SmolStr);

impl TemplateId {
    const GENERATED_PREFIX: &'static str = "tpl-";

    pub fn generate() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::GENERATED_PREFIX, nanoid::nanoid!(12))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl Deref for TemplateId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TemplateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TemplateId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TemplateId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
