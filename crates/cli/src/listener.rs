// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pw_engine::TaskListener;

/// Run listener for an operator terminal: info to stdout, problems to stderr.
pub struct PrintListener;

impl TaskListener for PrintListener {
    fn info(&self, line: &str) {
        println!("{}", line);
    }

    fn error(&self, line: &str) {
        eprintln!("error: {}", line);
    }

    fn fatal(&self, line: &str) {
        eprintln!("fatal: {}", line);
    }
}
