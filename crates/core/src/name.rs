// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent name generation.
//!
//! Agent names double as pod names, so every generated name is a valid
//! DNS-1123 subdomain of at most [`MAX_NAME_LEN`] characters.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix used when a template has no usable name.
pub const DEFAULT_PREFIX: &str = "podwright-agent";

/// Longest name the orchestrator accepts.
pub const MAX_NAME_LEN: usize = 63;

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 5;

/// Suffix alphabet. No vowels, so suffixes never spell words.
pub const SUFFIX_ALPHABET: [char; 30] = [
    'b', 'c', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'm', 'n', 'p', 'q', 'r', 's', 't', 'v', 'w', 'x',
    'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

#[allow(clippy::expect_used)]
static LEGAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("constant regex pattern is valid")
});

/// Whether `name` is acceptable as a pod name.
pub fn is_legal_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN && LEGAL_NAME.is_match(name)
}

/// Generate a fresh, legal agent name derived from `template_name`.
pub fn generate_name(template_name: &str) -> String {
    generate_name_with_suffix(template_name, &random_suffix())
}

/// Like [`generate_name`] with a caller-chosen suffix.
///
/// `suffix` must itself be drawn from [`SUFFIX_ALPHABET`]; the result falls
/// back to `{DEFAULT_PREFIX}-{suffix}` whenever the template name cannot
/// produce a legal name.
pub fn generate_name_with_suffix(template_name: &str, suffix: &str) -> String {
    let fallback = format!("{}-{}", DEFAULT_PREFIX, suffix);
    if template_name.is_empty() {
        return fallback;
    }

    let budget = MAX_NAME_LEN.saturating_sub(1 + suffix.chars().count());
    let stem: String = normalize(template_name).chars().take(budget).collect();
    let candidate = format!("{}-{}", stem, suffix);
    if is_legal_name(&candidate) {
        candidate
    } else {
        fallback
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn random_suffix() -> String {
    nanoid::nanoid!(SUFFIX_LEN, &SUFFIX_ALPHABET)
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
