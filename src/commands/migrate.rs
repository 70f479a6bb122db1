//! `migrate` command.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::logging::Logger;
use crate::operations::{DotfileOps, MigrationReport};

/// Repoint the userspace links under `userspace_dir` at the dotfiles tree
/// now found at `dotfiles_dir`.
///
/// # Errors
///
/// Returns an error if either directory cannot be resolved or a link cannot
/// be replaced.
pub fn run(dotfiles_dir: &Path, userspace_dir: &Path, log: &Logger) -> Result<()> {
    let ops = DotfileOps::new(userspace_dir, dotfiles_dir)?;
    run_with_report(&ops, log).map(drop)
}

/// Migrate using an existing set of roots.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_report(ops: &DotfileOps, log: &Logger) -> Result<MigrationReport> {
    log.stage(&format!(
        "Migrating links under {} to {}",
        ops.userspace_root().display(),
        ops.dotfiles_root().display()
    ));
    let report = ops
        .migrate_symlinks()
        .with_context(|| format!("migrating {}", ops.dotfiles_root().display()))?;
    for path in &report.relinked {
        log.debug(&format!("relinked {}", path.display()));
    }
    for path in &report.untouched {
        log.debug(&format!("left {} (not a symlink)", path.display()));
    }
    log.info(&format!(
        "{} relinked, {} missing, {} untouched",
        report.relinked.len(),
        report.missing.len(),
        report.untouched.len()
    ));
    Ok(report)
}
