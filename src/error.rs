//! Domain-specific error types for the dotsync engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`FsError`], [`SyncError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! ConfigError  configuration file loading and validation
//! FsError      path mapping and dotfile operations
//! ExecError    shell subprocess failures
//! SyncError    remote reconciliation
//! CliError     command surface
//! ```
//!
//! Every error reports a stable *kind* string (e.g. [`FsError::kind`])
//! which the binary prints as the prefix of its single-line error report.
//! [`classify`] finds it anywhere in an [`anyhow::Error`] chain.

use std::path::PathBuf;

use thiserror::Error;

use crate::sync::SyncState;

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A line could not be interpreted.
    #[error("line {line}: {message}")]
    Malformed {
        /// 1-based line number (0 when the problem is not tied to a line).
        line: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A required key is absent.
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    /// The configuration file could not be read.
    #[error("reading config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The home directory is needed for `~/` expansion but cannot be found.
    #[error("cannot determine the home directory")]
    NoHome,
}

impl ConfigError {
    /// Stable kind string for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed { .. } | Self::NoHome => "config-malformed",
            Self::MissingKey(_) => "config-missing-key",
            Self::Read { .. } => "config-read",
        }
    }
}

/// Errors that arise from path mapping and dotfile operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// An expected path is absent.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The destination path exists and would be overwritten.
    #[error("path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The destination exists; the caller may retry with overwrite permission.
    #[error("{} already exists, refusing to overwrite", .0.display())]
    AbortOnOverwrite(PathBuf),

    /// Planned destination awaiting user confirmation.
    #[error("confirm destination {}", .0.display())]
    ConfirmProceed(PathBuf),

    /// The path is not lexically under the declared root.
    #[error("{} is not under {}", path.display(), root.display())]
    PrefixMismatch {
        /// Offending path.
        path: PathBuf,
        /// Root it was expected to be under.
        root: PathBuf,
    },

    /// An expected symlink is absent or is not a symlink.
    #[error("expected a symlink at {}", .0.display())]
    SymlinkMissing(PathBuf),

    /// An expected dotfile tree entry is absent.
    #[error("dotfile not found: {}", .0.display())]
    DotfileMissing(PathBuf),

    /// A path could not be inspected.
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        /// Path that could not be inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A filesystem step failed.
    #[error("{step} {}: {source}", path.display())]
    Io {
        /// The step that failed (e.g. `"copy"`, `"back up"`).
        step: &'static str,
        /// Path the step was operating on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The home directory is needed for `~/` expansion but cannot be found.
    #[error("cannot determine the home directory")]
    NoHome,
}

impl FsError {
    /// Wrap an I/O error with the step and path it belongs to.
    pub fn io(step: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            step,
            path: path.into(),
            source,
        }
    }

    /// Stable kind string for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::NoHome => "not-found",
            Self::AlreadyExists(_) => "already-exists",
            Self::AbortOnOverwrite(_) => "abort-on-overwrite",
            Self::ConfirmProceed(_) => "confirm-proceed",
            Self::PrefixMismatch { .. } => "prefix-mismatch",
            Self::SymlinkMissing(_) => "symlink-missing",
            Self::DotfileMissing(_) => "dotfile-missing",
            Self::Stat { .. } => "stat-error",
            Self::Io { .. } => "io",
        }
    }

    /// Whether this error is a soft signal (the operation may be retried
    /// after asking the user).
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::AbortOnOverwrite(_) | Self::ConfirmProceed(_))
    }
}

/// Errors that arise from running shell commands.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The shell could not be started.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        /// Command string handed to the shell.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The command ran and exited non-zero.
    #[error("`{command}` failed (exit {}): {}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()), output.trim())]
    NonZero {
        /// Command string handed to the shell.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Combined stdout and stderr.
        output: String,
    },
}

impl ExecError {
    /// Stable kind string for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "shell-launch",
            Self::NonZero { .. } => "shell-exec",
        }
    }
}

/// Errors that arise from remote synchronisation.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A version-control command failed in the given state.
    #[error("sync failed during {state}: {source}")]
    Fatal {
        /// State in which the failure occurred.
        state: SyncState,
        /// Underlying shell error.
        source: ExecError,
    },

    /// The merge could not be completed and was aborted.
    #[error(
        "merge conflict in {}: {}",
        repo.display(),
        if *abort_failed {
            "merge --abort also failed, resolve the repository manually"
        } else {
            "merge aborted, resolve the conflict manually"
        }
    )]
    MergeConflict {
        /// Working copy the merge ran in.
        repo: PathBuf,
        /// Whether `merge --abort` itself failed.
        abort_failed: bool,
    },

    /// A command succeeded but its output did not contain the expected marker.
    #[error("unexpected output from `{command}`: {}", output.trim())]
    UnmatchedOutput {
        /// Command whose output was inspected.
        command: String,
        /// Combined stdout and stderr.
        output: String,
    },
}

impl SyncError {
    /// Stable kind string for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fatal { .. } => "fatal-sync-error",
            Self::MergeConflict { .. } => "merge-conflict",
            Self::UnmatchedOutput { .. } => "unmatched-shell-output",
        }
    }
}

/// Errors that arise from the command surface.
#[derive(Error, Debug)]
pub enum CliError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// The command name is not known.
    #[error("{0}")]
    UnknownCommand(String),

    /// The positional argument count does not match the command.
    #[error("{0}")]
    ArgumentCount(String),

    /// Help was requested; not a failure.
    #[error("help requested")]
    HelpRequested,
}

impl CliError {
    /// Stable kind string for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "cli-parse",
            Self::UnknownCommand(_) => "cli-unknown-command",
            Self::ArgumentCount(_) => "cli-argument-count",
            Self::HelpRequested => "cli-help-requested",
        }
    }
}

/// Kind and severity of an error surfaced at the command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Stable kind string.
    pub kind: &'static str,
    /// Whether the error should be reported as a warning.
    pub soft: bool,
}

/// Find the most specific typed error in `err`'s chain.
///
/// Errors that carry no typed cause are reported with kind `"error"`.
#[must_use]
pub fn classify(err: &anyhow::Error) -> Classification {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<FsError>() {
            return Classification {
                kind: e.kind(),
                soft: e.is_soft(),
            };
        }
        let kind = cause
            .downcast_ref::<ConfigError>()
            .map(ConfigError::kind)
            .or_else(|| cause.downcast_ref::<SyncError>().map(SyncError::kind))
            .or_else(|| cause.downcast_ref::<ExecError>().map(ExecError::kind))
            .or_else(|| cause.downcast_ref::<CliError>().map(CliError::kind));
        if let Some(kind) = kind {
            return Classification { kind, soft: false };
        }
    }
    Classification {
        kind: "error",
        soft: false,
    }
}

/// Friendly result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;
