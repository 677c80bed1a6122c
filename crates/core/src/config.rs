// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file format.
//!
//! ```toml
//! [[cloud]]
//! name = "k8s"
//! namespace = "ci"
//! default_retention = "retain_on_failure"
//!
//! [[cloud.template]]
//! id = "base"
//! name = "base"
//!
//! [[cloud.template.container]]
//! name = "jnlp"
//! image = "agent:latest"
//!
//! [[cloud.template]]
//! id = "maven"
//! name = "maven"
//! inherit_from = ["base"]
//! ```

use crate::cloud::CloudConfig;
use crate::template::{Template, TemplateRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cloud {0} is declared twice")]
    DuplicateCloud(String),
}

/// A cloud and the templates registered with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudSpec {
    #[serde(flatten)]
    pub cloud: CloudConfig,
    #[serde(default, rename = "template", skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<Template>,
}

impl CloudSpec {
    /// A fresh registry holding this cloud's templates.
    pub fn registry(&self) -> TemplateRegistry {
        TemplateRegistry::from_templates(self.templates.iter().cloned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, rename = "cloud")]
    pub clouds: Vec<CloudSpec>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: PathBuf::from("<inline>"), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn cloud(&self, name: &str) -> Option<&CloudSpec> {
        self.clouds.iter().find(|c| c.cloud.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.clouds {
            if !seen.insert(spec.cloud.name.as_str()) {
                return Err(ConfigError::DuplicateCloud(spec.cloud.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
