//! Running accepted invocations
//!
//! Programs are started directly with an argv list. No shell is involved, so
//! metacharacters in arguments are plain text to the child.

use std::process::{Command, Stdio};

use crate::output::GENERIC_EXEC_FAILURE;

/// What a finished (or failed-to-start) program produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub success: bool,

    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,

    pub stdout: String,

    /// Captured stderr, or a generic message when the program failed silently
    pub stderr: String,
}

impl ExecOutcome {
    pub fn spawn_failed() -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: GENERIC_EXEC_FAILURE.to_string(),
        }
    }
}

/// Capability to run a program and wait for it
pub trait Executor {
    fn run(&self, program: &str, args: &[String]) -> ExecOutcome;
}

/// Runs real processes with the host's inherited environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[String]) -> ExecOutcome {
        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(_) => return ExecOutcome::spawn_failed(),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return ExecOutcome {
                success: true,
                exit_code: output.status.code(),
                stdout,
                stderr: String::new(),
            };
        }

        let stderr = if output.stderr.is_empty() {
            GENERIC_EXEC_FAILURE.to_string()
        } else {
            String::from_utf8_lossy(&output.stderr).into_owned()
        };

        ExecOutcome {
            success: false,
            exit_code: output.status.code(),
            stdout,
            stderr,
        }
    }
}
