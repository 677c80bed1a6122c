// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-storage: persistence for agent records and template registries
//!
//! Records are stored one JSON file per agent so that concurrent agents never
//! rewrite each other's state. Runtime-only fields (pod handle, executables)
//! are not part of the serialized form.

mod file;
mod store;

pub use file::{FileStore, CURRENT_RECORD_VERSION};
pub use store::{RecordStore, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
