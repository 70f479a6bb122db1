//! Remote synchronisation of the sync directory.
//!
//! [`Syncer::run`] drives a fixed sequence of version-control commands and
//! decides each transition from their exit status and output:
//!
//! ```text
//! Fetch -> CheckAhead -+-> PushAhead -+-> CheckDirty -+-> PullOnly -> Done
//!                      +--------------+               +-> Commit -> PullMerge -+-> PushFinal -> Done
//!                                                                              +-> AbortMerge -> merge-conflict
//! ```
//!
//! Unpushed commits are pushed before the dirty check so they cannot be
//! lost behind a later merge. The only recovery is `merge --abort`; conflicts
//! are left for the user to resolve.
pub mod vcs;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::SyncError;
use crate::exec::{Executor, MatchResult, ShellOutput};
use vcs::{Probe, VcsAdapter, VcsCommand};

/// A step of the sync state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Fetch from the remote.
    Fetch,
    /// Check for local commits not yet pushed.
    CheckAhead,
    /// Push local commits before anything else.
    PushAhead,
    /// Check for uncommitted changes.
    CheckDirty,
    /// Clean working copy: pull and finish.
    PullOnly,
    /// Stage and commit local changes.
    Commit,
    /// Fetch again and merge the remote branch.
    PullMerge,
    /// Merge failed: abort it and report a conflict.
    AbortMerge,
    /// Push the merged result.
    PushFinal,
    /// Finished successfully.
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::CheckAhead => "check-ahead",
            Self::PushAhead => "push-ahead",
            Self::CheckDirty => "check-dirty",
            Self::PullOnly => "pull-only",
            Self::Commit => "commit",
            Self::PullMerge => "pull-merge",
            Self::AbortMerge => "abort-merge",
            Self::PushFinal => "push-final",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// States visited by a successful sync, in order, ending with
/// [`SyncState::Done`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Visited states.
    pub trace: Vec<SyncState>,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.trace.iter().map(ToString::to_string).collect();
        f.write_str(&names.join(" -> "))
    }
}

/// Reconciles a working copy with its remote.
#[derive(Debug, Clone)]
pub struct Syncer {
    repo: PathBuf,
    executor: Arc<dyn Executor>,
    vcs: Arc<dyn VcsAdapter>,
}

impl Syncer {
    /// Sync the working copy at `repo`.
    pub fn new(
        repo: impl Into<PathBuf>,
        executor: Arc<dyn Executor>,
        vcs: Arc<dyn VcsAdapter>,
    ) -> Self {
        Self {
            repo: repo.into(),
            executor,
            vcs,
        }
    }

    /// Working copy being synced.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Run one full sync.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Fatal`] if a command cannot be launched or exits
    ///   non-zero where success is required
    /// - [`SyncError::MergeConflict`] if the merge did not succeed; the merge
    ///   has been aborted (or the abort failed, which the error records)
    /// - [`SyncError::UnmatchedOutput`] if the final push succeeded without
    ///   reporting the branch update
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let mut trace = Vec::new();
        let mut state = SyncState::Fetch;
        loop {
            tracing::debug!(%state, "sync step");
            trace.push(state);
            state = match state {
                SyncState::Fetch => {
                    self.run_checked(state, VcsCommand::Fetch)?;
                    SyncState::CheckAhead
                }
                SyncState::CheckAhead => {
                    if self.probe(state, VcsCommand::Status, Probe::Ahead)? {
                        SyncState::PushAhead
                    } else {
                        SyncState::CheckDirty
                    }
                }
                SyncState::PushAhead => {
                    self.run_checked(state, VcsCommand::Push)?;
                    SyncState::CheckDirty
                }
                SyncState::CheckDirty => {
                    if self.probe(state, VcsCommand::Status, Probe::Clean)? {
                        SyncState::PullOnly
                    } else {
                        SyncState::Commit
                    }
                }
                SyncState::PullOnly => {
                    self.run_checked(state, VcsCommand::Pull)?;
                    SyncState::Done
                }
                SyncState::Commit => {
                    self.run_checked(state, VcsCommand::AddAll)?;
                    self.run_checked(state, VcsCommand::Commit)?;
                    SyncState::PullMerge
                }
                SyncState::PullMerge => {
                    self.run_checked(state, VcsCommand::Fetch)?;
                    let merge = self.run_matching(state, VcsCommand::Merge, Probe::MergeSucceeded)?;
                    if merge.matched {
                        SyncState::PushFinal
                    } else {
                        SyncState::AbortMerge
                    }
                }
                SyncState::AbortMerge => return Err(self.abort_merge()),
                SyncState::PushFinal => {
                    let push = self.run_matching(state, VcsCommand::Push, Probe::PushAccepted)?;
                    let output = push
                        .output
                        .into_result()
                        .map_err(|source| SyncError::Fatal { state, source })?;
                    if !push.matched {
                        return Err(SyncError::UnmatchedOutput {
                            command: output.command,
                            output: output.output,
                        });
                    }
                    SyncState::Done
                }
                SyncState::Done => return Ok(SyncReport { trace }),
            };
        }
    }

    fn execute(&self, state: SyncState, command: VcsCommand) -> Result<ShellOutput, SyncError> {
        self.executor
            .execute(&self.repo, &self.vcs.command(command))
            .map_err(|source| SyncError::Fatal { state, source })
    }

    fn run_checked(&self, state: SyncState, command: VcsCommand) -> Result<ShellOutput, SyncError> {
        self.execute(state, command)?
            .into_result()
            .map_err(|source| SyncError::Fatal { state, source })
    }

    fn run_matching(
        &self,
        state: SyncState,
        command: VcsCommand,
        probe: Probe,
    ) -> Result<MatchResult, SyncError> {
        let markers = self.vcs.markers(probe);
        let needles: Vec<&str> = markers.iter().map(String::as_str).collect();
        self.executor
            .execute_with_match(&self.repo, &self.vcs.command(command), &needles)
            .map_err(|source| SyncError::Fatal { state, source })
    }

    /// Run a status-style command that must succeed and report whether
    /// `probe` holds.
    fn probe(
        &self,
        state: SyncState,
        command: VcsCommand,
        probe: Probe,
    ) -> Result<bool, SyncError> {
        let result = self.run_matching(state, command, probe)?;
        result
            .output
            .into_result()
            .map_err(|source| SyncError::Fatal { state, source })?;
        Ok(result.matched)
    }

    fn abort_merge(&self) -> SyncError {
        let abort_failed = match self.execute(SyncState::AbortMerge, VcsCommand::MergeAbort) {
            Ok(output) => !output.success(),
            Err(e) => {
                tracing::debug!("merge --abort: {e}");
                true
            }
        };
        SyncError::MergeConflict {
            repo: self.repo.clone(),
            abort_failed,
        }
    }
}
