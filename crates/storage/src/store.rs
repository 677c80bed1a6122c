// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pw_core::{AgentName, AgentRecord};
use thiserror::Error;

/// Errors that can occur in store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported record version {0}")]
    Version(u32),
}

/// Durable home of agent records.
pub trait RecordStore: Send + Sync {
    /// Insert or overwrite the record with the same name
    fn save(&self, record: &AgentRecord) -> Result<(), StoreError>;

    /// Forget a record; removing an unknown name is not an error
    fn remove(&self, name: &AgentName) -> Result<(), StoreError>;

    /// Every stored record, sorted by name
    fn load_all(&self) -> Result<Vec<AgentRecord>, StoreError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod memory {
    use super::{RecordStore, StoreError};
    use parking_lot::Mutex;
    use pw_core::{AgentName, AgentRecord};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct MemoryState {
        records: BTreeMap<AgentName, AgentRecord>,
        saves: usize,
        fail: bool,
    }

    /// In-memory record store for testing
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        inner: Arc<Mutex<MemoryState>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get(&self, name: &str) -> Option<AgentRecord> {
            self.inner.lock().records.get(name).cloned()
        }

        pub fn len(&self) -> usize {
            self.inner.lock().records.len()
        }

        pub fn is_empty(&self) -> bool {
            self.inner.lock().records.is_empty()
        }

        /// Number of successful `save` calls
        pub fn save_count(&self) -> usize {
            self.inner.lock().saves
        }

        /// Make every later call fail with an IO error
        pub fn fail_writes(&self) {
            self.inner.lock().fail = true;
        }
    }

    impl RecordStore for MemoryStore {
        fn save(&self, record: &AgentRecord) -> Result<(), StoreError> {
            let mut inner = self.inner.lock();
            if inner.fail {
                return Err(StoreError::Io(std::io::Error::other("store unavailable")));
            }
            inner.records.insert(record.name.clone(), record.clone());
            inner.saves += 1;
            Ok(())
        }

        fn remove(&self, name: &AgentName) -> Result<(), StoreError> {
            let mut inner = self.inner.lock();
            if inner.fail {
                return Err(StoreError::Io(std::io::Error::other("store unavailable")));
            }
            inner.records.remove(name);
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<AgentRecord>, StoreError> {
            Ok(self.inner.lock().records.values().cloned().collect())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
