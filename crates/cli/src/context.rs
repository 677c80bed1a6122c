// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading configuration and assembling the controller for one invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use pw_adapters::KubeOrchestrator;
use pw_core::{CloudSpec, Config, SystemClock};
use pw_engine::{Cloud, LifecycleController};
use pw_storage::FileStore;

use crate::exit_error::ExitError;

pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).map_err(|e| ExitError::usage(e.to_string()).into())
}

/// The cloud named `name`, or the only cloud when no name is given.
pub fn select_cloud<'a>(config: &'a Config, name: Option<&str>) -> Result<&'a CloudSpec, ExitError> {
    match name {
        Some(name) => config
            .cloud(name)
            .ok_or_else(|| ExitError::usage(format!("unknown cloud {}", name))),
        None => match config.clouds.as_slice() {
            [only] => Ok(only),
            [] => Err(ExitError::usage("no clouds configured")),
            many => Err(ExitError::usage(format!(
                "{} clouds configured; pass --cloud",
                many.len()
            ))),
        },
    }
}

pub struct Context {
    pub config: Config,
    pub controller: LifecycleController<SystemClock>,
}

impl Context {
    /// Wire the controller to the cluster and to the state directory.
    ///
    /// Each cloud's registry starts from its saved snapshot with the
    /// configured templates published over it, so agents provisioned from a
    /// template since dropped from the config can still resolve it.
    pub fn open(config: Config, state_dir: PathBuf) -> Result<Self> {
        let store = FileStore::new(state_dir);
        let controller = LifecycleController::new(
            Arc::new(KubeOrchestrator::new()),
            Arc::new(store.clone()),
            SystemClock,
        );

        for spec in &config.clouds {
            let registry = store.load_templates(&spec.cloud.name)?;
            for template in &spec.templates {
                registry.add(template.clone());
            }
            store.save_templates(&spec.cloud.name, &registry)?;
            tracing::debug!(cloud = %spec.cloud.name, templates = registry.len(), "loaded cloud");
            controller.add_cloud(Cloud::new(spec.cloud.clone(), registry));
        }
        controller.restore_from_store()?;

        Ok(Self { config, controller })
    }

    pub fn cloud_name(&self, name: Option<&str>) -> Result<String, ExitError> {
        select_cloud(&self.config, name).map(|spec| spec.cloud.name.clone())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
