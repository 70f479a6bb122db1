//! Shell command execution.
//!
//! Commands are handed to `sh -c` as a single string. Only strings built by
//! this crate from fixed tables are executed; user input is never
//! interpolated.
pub mod scripted;

use std::path::Path;
use std::process::Command;

use crate::error::ExecError;

/// Captured result of a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Command string handed to the shell.
    pub command: String,
    /// Combined stdout and stderr, in the order the command wrote them.
    pub output: String,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ShellOutput {
    /// Whether the command exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Whether any of `needles` occurs in the output.
    #[must_use]
    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.output.contains(n))
    }

    /// Turn a non-zero exit into [`ExecError::NonZero`].
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::NonZero`] if the command did not succeed.
    pub fn into_result(self) -> Result<Self, ExecError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExecError::NonZero {
                command: self.command,
                code: self.code,
                output: self.output,
            })
        }
    }
}

/// Output of a command together with whether it contained a marker.
///
/// `matched` is computed even when the command exited non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether any requested substring occurred in the output.
    pub matched: bool,
    /// The captured command result.
    pub output: ShellOutput,
}

/// Runs shell commands in a working directory.
///
/// Implementations return `Err` only when the shell could not be started; a
/// non-zero exit is reported through [`ShellOutput::code`].
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `command` with `sh -c` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Launch`] if the shell cannot be started.
    fn execute(&self, dir: &Path, command: &str) -> Result<ShellOutput, ExecError>;

    /// Run `command` and report whether any of `needles` occurs in its
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Launch`] if the shell cannot be started.
    fn execute_with_match(
        &self,
        dir: &Path,
        command: &str,
        needles: &[&str],
    ) -> Result<MatchResult, ExecError> {
        let output = self.execute(dir, command)?;
        Ok(MatchResult {
            matched: output.contains_any(needles),
            output,
        })
    }
}

/// [`Executor`] that spawns `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    env: Vec<(String, String)>,
}

impl ShellExecutor {
    /// Executor with the inherited environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor for version-control commands, with the locale pinned so that
    /// output markers do not depend on the user's language.
    #[must_use]
    pub fn for_vcs() -> Self {
        Self::new().with_env("LC_ALL", "C")
    }

    /// Add an environment variable for every command.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl Executor for ShellExecutor {
    fn execute(&self, dir: &Path, command: &str) -> Result<ShellOutput, ExecError> {
        let mut cmd = Command::new("sh");
        // Redirect stderr into stdout inside the shell so the two streams
        // keep their relative order.
        cmd.arg("-c")
            .arg(format!("exec 2>&1\n{command}"))
            .current_dir(dir);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        tracing::debug!(dir = %dir.display(), "$ {command}");
        let output = cmd.output().map_err(|source| ExecError::Launch {
            command: command.to_string(),
            source,
        })?;
        Ok(ShellOutput {
            command: command.to_string(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            code: output.status.code(),
        })
    }
}

/// Check if a program is available on `PATH`.
#[must_use]
pub fn which(program: &str) -> bool {
    which::which(program).is_ok()
}
