// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed persistence.
//!
//! Layout under the state directory:
//!
//! ```text
//! agents/<name>.json        one envelope per live agent
//! templates/<cloud>.json    saved template registry of a cloud
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed into place. Files that
//! cannot be read back are moved aside to `.bak` and skipped.

use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, Utc};
use pw_core::{AgentName, AgentRecord, Template, TemplateRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current on-disk schema version
pub const CURRENT_RECORD_VERSION: u32 = 1;

const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "v")]
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordBody {
    record: AgentRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplatesBody {
    templates: Vec<Template>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn agents_dir(&self) -> PathBuf {
        self.root.join("agents")
    }

    fn agent_path(&self, name: &AgentName) -> PathBuf {
        self.agents_dir().join(format!("{}.json", name))
    }

    fn templates_path(&self, cloud: &str) -> PathBuf {
        self.root.join("templates").join(format!("{}.json", cloud))
    }

    /// Persist every template of `registry` for `cloud`, in registration order.
    pub fn save_templates(&self, cloud: &str, registry: &TemplateRegistry) -> Result<(), StoreError> {
        let templates = registry.templates().iter().map(|t| Template::clone(t)).collect();
        write_envelope(&self.templates_path(cloud), TemplatesBody { templates })
    }

    /// Load the saved registry of `cloud`; an unsaved cloud yields an empty one.
    pub fn load_templates(&self, cloud: &str) -> Result<TemplateRegistry, StoreError> {
        let path = self.templates_path(cloud);
        if !path.exists() {
            return Ok(TemplateRegistry::new());
        }
        let body: TemplatesBody = read_envelope(&path)?;
        Ok(TemplateRegistry::from_templates(body.templates))
    }
}

impl RecordStore for FileStore {
    fn save(&self, record: &AgentRecord) -> Result<(), StoreError> {
        write_envelope(&self.agent_path(&record.name), RecordBody { record: record.clone() })
    }

    fn remove(&self, name: &AgentName) -> Result<(), StoreError> {
        match fs::remove_file(self.agent_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load_all(&self) -> Result<Vec<AgentRecord>, StoreError> {
        let dir = self.agents_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_envelope::<RecordBody>(&path) {
                Ok(body) => records.push(body.record),
                Err(e) => {
                    let bak = rotate_bak_path(&path);
                    tracing::warn!(
                        path = %path.display(),
                        bak = %bak.display(),
                        error = %e,
                        "unreadable agent record, moving aside"
                    );
                    if let Err(e) = fs::rename(&path, &bak) {
                        tracing::warn!(path = %path.display(), error = %e, "failed to move record aside");
                    }
                }
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

fn write_envelope<T: Serialize>(path: &Path, body: T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let envelope = Envelope { version: CURRENT_RECORD_VERSION, saved_at: Utc::now(), body };
    let json = serde_json::to_string_pretty(&envelope)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json.as_bytes())?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_envelope<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path)?;
    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    if envelope.version > CURRENT_RECORD_VERSION {
        return Err(StoreError::Version(envelope.version));
    }
    Ok(envelope.body)
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
