//! `add` command.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::logging::Logger;
use crate::operations::DotfileOps;

/// Move `path` into the dotfiles tree and link it back.
///
/// # Errors
///
/// Returns an error if the file cannot be added.
pub fn run(ops: &DotfileOps, path: &Path, log: &Logger) -> Result<()> {
    log.stage(&format!("Adding {}", path.display()));
    let linked = ops
        .add(path)
        .with_context(|| format!("adding {}", path.display()))?;
    if let Some(backup) = &linked.backup {
        log.debug(&format!("backup at {}", backup.display()));
    }
    log.info(&format!(
        "{} -> {}",
        linked.userspace.display(),
        linked.dotfile.display()
    ));
    Ok(())
}
