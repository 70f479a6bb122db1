//! `revert` command.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::logging::Logger;
use crate::operations::DotfileOps;

/// Replace the userspace link for `path` with a real copy and drop the
/// dotfile.
///
/// # Errors
///
/// Returns an error if the file cannot be reverted.
pub fn run(ops: &DotfileOps, path: &Path, log: &Logger) -> Result<()> {
    log.stage(&format!("Reverting {}", path.display()));
    let reverted = ops
        .revert(path)
        .with_context(|| format!("reverting {}", path.display()))?;
    log.debug(&format!("backup at {}", reverted.backup.display()));
    log.info(&format!(
        "restored {}, removed {}",
        reverted.userspace.display(),
        reverted.dotfile.display()
    ));
    Ok(())
}
