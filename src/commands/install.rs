//! `install` command: link a dotfile into userspace, asking before anything
//! in the way is replaced.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::error::FsError;
use crate::logging::Logger;
use crate::operations::{DotfileOps, ImportKind};
use crate::prompt::Confirm;
use crate::resources::ResourceChange;

/// What `install` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The userspace symlink was created.
    Installed,
    /// The userspace symlink already pointed at the dotfile.
    AlreadyInstalled,
    /// The user declined a prompt; nothing more was changed.
    Declined,
}

/// Install `path`, importing it from the external tree rooted at `external`
/// first when given.
///
/// # Errors
///
/// Returns an error if the import or the install fails, or if the prompt
/// cannot be read.
pub fn run(
    ops: &DotfileOps,
    path: &Path,
    external: Option<&Path>,
    prompt: &mut dyn Confirm,
    log: &Logger,
) -> Result<()> {
    run_with_outcome(ops, path, external, prompt, log).map(drop)
}

/// [`run`], reporting the [`Outcome`].
///
/// # Errors
///
/// See [`run`].
pub fn run_with_outcome(
    ops: &DotfileOps,
    path: &Path,
    external: Option<&Path>,
    prompt: &mut dyn Confirm,
    log: &Logger,
) -> Result<Outcome> {
    let target = match external {
        Some(root) => match import(ops, path, root, prompt, log)? {
            Some(destination) => destination,
            None => return Ok(Outcome::Declined),
        },
        None => path.to_path_buf(),
    };
    link(ops, &target, prompt, log)
}

fn import(
    ops: &DotfileOps,
    path: &Path,
    root: &Path,
    prompt: &mut dyn Confirm,
    log: &Logger,
) -> Result<Option<PathBuf>> {
    log.stage(&format!("Importing {}", path.display()));
    match ops.import_external(path, root, true) {
        Err(FsError::ConfirmProceed(destination)) => {
            let question = format!(
                "{} will be imported to {}",
                path.display(),
                destination.display()
            );
            if !prompt.confirm(&question).context("reading answer")? {
                log.warn(&format!("not importing {}", path.display()));
                return Ok(None);
            }
        }
        Ok(imported) => return Ok(Some(imported.destination)),
        Err(e) => return Err(e).with_context(|| format!("importing {}", path.display())),
    }

    let imported = ops
        .import_external(path, root, false)
        .with_context(|| format!("importing {}", path.display()))?;
    match &imported.kind {
        ImportKind::Copied { backup } => log.debug(&format!("backup at {}", backup.display())),
        ImportKind::Linked { target } => {
            log.debug(&format!("imported as link to {}", target.display()));
        }
    }
    log.info(&format!(
        "{} -> {}",
        imported.source.display(),
        imported.destination.display()
    ));
    Ok(Some(imported.destination))
}

fn link(
    ops: &DotfileOps,
    path: &Path,
    prompt: &mut dyn Confirm,
    log: &Logger,
) -> Result<Outcome> {
    log.stage(&format!("Installing {}", path.display()));
    let linked = match ops.install(path, false) {
        Err(FsError::AbortOnOverwrite(existing)) => {
            let question = format!("{} already exists and will be replaced", existing.display());
            if !prompt.confirm(&question).context("reading answer")? {
                log.warn(&format!("left {} untouched", existing.display()));
                return Ok(Outcome::Declined);
            }
            ops.install(path, true)
        }
        other => other,
    }
    .with_context(|| format!("installing {}", path.display()))?;

    if let Some(backup) = &linked.backup {
        log.debug(&format!("backup at {}", backup.display()));
    }
    if linked.change == ResourceChange::AlreadyCorrect {
        log.info(&format!("{} already installed", linked.userspace.display()));
        return Ok(Outcome::AlreadyInstalled);
    }
    log.info(&format!(
        "{} -> {}",
        linked.userspace.display(),
        linked.dotfile.display()
    ));
    Ok(Outcome::Installed)
}
