use std::path::{Path, PathBuf};

use super::DotfileOps;
use crate::error::{FsError, FsResult};
use crate::paths;
use crate::resources::fs::{copy_file_or_dir, ensure_parent_dir};
use crate::resources::symlink::create_symlink;

/// How an external entry was brought into the dotfiles tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// A regular file or directory was copied, after being backed up.
    Copied {
        /// Backup of the source.
        backup: PathBuf,
    },
    /// The source was a symlink; the destination is a symlink to the same
    /// place, resolved against the external root.
    Linked {
        /// Target stored in the new link.
        target: PathBuf,
    },
}

/// Result of importing an entry from an external dotfiles tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    /// Entry in the external tree.
    pub source: PathBuf,
    /// Where it now lives in the dotfiles tree.
    pub destination: PathBuf,
    /// How it was imported.
    pub kind: ImportKind,
}

impl DotfileOps {
    /// Bring `path` from an external dotfiles-shaped tree rooted at
    /// `external_root` into the dotfiles tree at the mirrored location.
    ///
    /// With `confirm` set nothing is touched: the planned destination is
    /// returned as [`FsError::ConfirmProceed`] for the caller to present, and
    /// the caller re-invokes with `confirm` cleared.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist
    /// - [`FsError::PrefixMismatch`] if `path` is not under `external_root`
    /// - [`FsError::ConfirmProceed`] when `confirm` is set
    /// - [`FsError::AlreadyExists`] if the destination exists
    /// - [`FsError::Io`] naming the step that failed
    pub fn import_external(
        &self,
        path: &Path,
        external_root: &Path,
        confirm: bool,
    ) -> FsResult<Imported> {
        let source = paths::to_absolute(path)?;
        let external_root = paths::absolutize(external_root)?;
        let destination = paths::replace_prefix(&source, &external_root, &self.dotfiles_root)?;
        if confirm {
            return Err(FsError::ConfirmProceed(destination));
        }
        if paths::exists(&destination) {
            return Err(FsError::AlreadyExists(destination));
        }

        let kind = if paths::is_symlink(&source)? {
            let stored =
                std::fs::read_link(&source).map_err(|e| FsError::io("read link", &source, e))?;
            // Joining an absolute stored target yields the target itself.
            let target = external_root.join(stored);
            ensure_parent_dir(&destination)?;
            create_symlink(&destination, &target)?;
            ImportKind::Linked { target }
        } else {
            let backup = self.backups.backup_file(&source)?;
            copy_file_or_dir(&source, &destination)?;
            ImportKind::Copied { backup }
        };
        tracing::debug!("imported {} to {}", source.display(), destination.display());

        Ok(Imported {
            source,
            destination,
            kind,
        })
    }
}
