//! `sync` command.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::exec::ShellExecutor;
use crate::logging::Logger;
use crate::sync::vcs::GitAdapter;
use crate::sync::{SyncReport, Syncer};

/// Syncer for the configured working copy, running git through `sh`.
#[must_use]
pub fn syncer_for(config: &Config) -> Syncer {
    Syncer::new(
        config.sync_dir.clone(),
        Arc::new(ShellExecutor::for_vcs()),
        Arc::new(GitAdapter::new(config.branch.clone())),
    )
}

/// Run one sync.
///
/// # Errors
///
/// Returns an error if the sync fails; see [`Syncer::run`].
pub fn run(syncer: &Syncer, log: &Logger) -> Result<SyncReport> {
    log.stage(&format!("Syncing {}", syncer.repo().display()));
    let report = syncer
        .run()
        .with_context(|| format!("syncing {}", syncer.repo().display()))?;
    log.debug(&format!("states: {report}"));
    log.info("up to date with remote");
    Ok(report)
}
