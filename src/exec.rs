//! External command execution.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, Output};

use crate::error::ExternalToolError;

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
///
/// The deployment engine only talks to processes through this trait so the
/// ordering and failure contract of shell hooks can be tested without
/// spawning anything.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run `program` in `dir`, failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[String]) -> Result<ExecResult>;

    /// Run `program` in `dir` with extra environment variables, returning the
    /// result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in(&self, dir: &Path, program: &str, args: &[String]) -> Result<ExecResult> {
        let label = format!("{program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {label}"))?;
        let result = ExecResult::from(output);
        if !result.success {
            return Err(ExternalToolError::Failed {
                command: label.trim_end().to_string(),
                code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(result)
    }

    fn run_unchecked_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        for (k, v) in env {
            cmd.env(k, v);
        }
        let output = cmd
            .output()
            .with_context(|| format!("failed to execute: {program} in {}", dir.display()))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
