// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing progress output.

/// Sink for the human-readable lines a build run shows about its agent.
pub trait TaskListener: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
    /// An error after which the run cannot continue
    fn fatal(&self, line: &str);
}

/// Listener that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl TaskListener for NullListener {
    fn info(&self, _line: &str) {}
    fn error(&self, _line: &str) {}
    fn fatal(&self, _line: &str) {}
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod buffer {
    use super::TaskListener;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Listener that keeps every line, prefixed with its level
    #[derive(Clone, Default)]
    pub struct BufferListener {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl BufferListener {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines.lock().iter().any(|l| l.contains(needle))
        }

        pub fn count(&self, needle: &str) -> usize {
            self.lines.lock().iter().filter(|l| l.contains(needle)).count()
        }
    }

    impl TaskListener for BufferListener {
        fn info(&self, line: &str) {
            self.lines.lock().push(format!("INFO {}", line));
        }

        fn error(&self, line: &str) {
            self.lines.lock().push(format!("ERROR {}", line));
        }

        fn fatal(&self, line: &str) {
            self.lines.lock().push(format!("FATAL {}", line));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use buffer::BufferListener;
