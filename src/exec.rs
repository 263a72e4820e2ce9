//! External process execution.
//!
//! Every external tool the engine drives (brew, stow, git, editors, shells)
//! is invoked through the [`Executor`] trait so that module logic can be
//! exercised in tests without touching the real system.
use anyhow::{Context as _, Result};
use std::process::{Command, Output};

use crate::error::ModuleError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Convert a non-zero exit into [`ModuleError::ExternalToolFailure`].
    ///
    /// # Errors
    ///
    /// Returns an error if the process did not exit successfully.
    pub fn check(self, label: &str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        Err(ModuleError::ExternalToolFailure {
            tool: label.to_string(),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        }
        .into())
    }
}

/// Abstraction over process spawning.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command, failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Execute a command and return the result, failing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    ExecResult::from(output).check(label)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Shared test helpers for code that drives an [`Executor`].
#[cfg(test)]
pub mod test_helpers {
    use super::{ExecResult, Executor};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A scripted executor that records every invocation.
    ///
    /// Responses are exit codes consumed in FIFO order; once the queue is
    /// empty every call succeeds. Recorded calls are `program arg1 arg2 ...`
    /// strings so tests can assert on the exact command line.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<i32>>,
        calls: Mutex<Vec<String>>,
        on_path: Vec<String>,
    }

    impl MockExecutor {
        /// Create a mock where every call succeeds.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue exit codes for the next calls, in order.
        #[must_use]
        pub fn with_exit_codes(self, codes: &[i32]) -> Self {
            if let Ok(mut guard) = self.responses.lock() {
                guard.extend(codes);
            }
            self
        }

        /// Make [`Executor::which`] report `program` as installed.
        #[must_use]
        pub fn with_program(mut self, program: &str) -> Self {
            self.on_path.push(program.to_string());
            self
        }

        /// Every command line issued so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        fn next(&self, program: &str, args: &[&str]) -> ExecResult {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            if let Ok(mut guard) = self.calls.lock() {
                guard.push(line);
            }
            let code = self
                .responses
                .lock()
                .ok()
                .and_then(|mut g| g.pop_front())
                .unwrap_or(0);
            ExecResult {
                stderr: if code == 0 {
                    String::new()
                } else {
                    "mock failure".to_string()
                },
                success: code == 0,
                code: Some(code),
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.next(program, args).check(program)
        }

        fn which(&self, program: &str) -> bool {
            self.on_path.iter().any(|p| p == program)
        }
    }
}
