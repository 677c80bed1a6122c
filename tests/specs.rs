// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for the `pw` binary.
//!
//! Every spec runs the real binary against a temporary config and state
//! directory. Nothing here talks to a cluster.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli"]
mod cli {
    mod agents;
    mod help;
    mod name;
    mod template;
}
