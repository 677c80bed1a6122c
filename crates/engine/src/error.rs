// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pw_adapters::OrchestratorError;
use pw_core::{AgentName, AgentStatus, InvalidTransition, TemplateError};
use pw_storage::StoreError;
use thiserror::Error;

/// Errors returned by controller operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("unknown cloud: {0}")]
    UnknownCloud(String),
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentName),
    /// The agent was terminated while its pod was being created; the pod
    /// has been deleted again
    #[error("agent {agent} was {status} before its pod was created")]
    Abandoned { agent: AgentName, status: AgentStatus },
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}
