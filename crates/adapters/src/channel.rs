// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control channel to a connected agent.
//!
//! The wire protocol lives outside this crate. Callers only need to deliver a
//! handful of instructions and bound how long they wait for delivery.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Instruction delivered to a connected agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Tell the agent process to exit instead of reconnecting once its pod
    /// goes away
    StopReconnecting,
}

pw_core::simple_display! {
    Instruction {
        StopReconnecting => "stop-reconnecting",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out waiting for the agent")]
    Timeout,
    #[error("channel closed")]
    Closed,
    #[error("transport failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// Deliver an instruction. The caller applies any timeout.
    async fn send(&self, instruction: Instruction) -> Result<(), TransportError>;
}

/// Channel backed by a tokio mpsc queue drained by the transport layer.
#[derive(Clone)]
pub struct MpscChannel {
    tx: mpsc::Sender<Instruction>,
}

impl MpscChannel {
    pub fn new(tx: mpsc::Sender<Instruction>) -> Self {
        Self { tx }
    }

    /// A channel and the receiver the transport layer reads from.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<Instruction>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl AgentChannel for MpscChannel {
    async fn send(&self, instruction: Instruction) -> Result<(), TransportError> {
        self.tx.send(instruction).await.map_err(|_| TransportError::Closed)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AgentChannel, Instruction, TransportError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeChannelState {
        sent: Vec<Instruction>,
        delay: Option<Duration>,
        error: Option<TransportError>,
    }

    /// Fake agent channel for testing
    #[derive(Clone, Default)]
    pub struct FakeChannel {
        inner: Arc<Mutex<FakeChannelState>>,
    }

    impl FakeChannel {
        pub fn new() -> Self {
            Self::default()
        }

        /// Sleep this long before acknowledging each send
        pub fn with_delay(self, delay: Duration) -> Self {
            self.inner.lock().delay = Some(delay);
            self
        }

        pub fn with_error(self, error: TransportError) -> Self {
            self.inner.lock().error = Some(error);
            self
        }

        /// Instructions that were acknowledged
        pub fn sent(&self) -> Vec<Instruction> {
            self.inner.lock().sent.clone()
        }
    }

    #[async_trait]
    impl AgentChannel for FakeChannel {
        async fn send(&self, instruction: Instruction) -> Result<(), TransportError> {
            let delay = self.inner.lock().delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let mut inner = self.inner.lock();
            if let Some(e) = &inner.error {
                return Err(e.clone());
            }
            inner.sent.push(instruction);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeChannel;

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
