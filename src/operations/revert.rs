use std::path::{Path, PathBuf};

use super::DotfileOps;
use crate::error::{FsError, FsResult};
use crate::paths;
use crate::resources::fs::{copy_file_or_dir, delete_file_or_dir};

/// Result of moving a dotfile back into userspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reverted {
    /// Userspace path that now holds the real file.
    pub userspace: PathBuf,
    /// Dotfile that was removed from the dotfiles tree.
    pub dotfile: PathBuf,
    /// Backup of the dotfile taken before it was removed.
    pub backup: PathBuf,
}

impl DotfileOps {
    /// Undo [`add`](Self::add): replace the userspace symlink with a copy of
    /// the dotfile and remove the dotfile from the dotfiles tree.
    ///
    /// `file` may name either side.
    ///
    /// # Errors
    ///
    /// - [`FsError::DotfileMissing`] if the dotfile does not exist
    /// - [`FsError::SymlinkMissing`] if the userspace path is not a symlink
    /// - [`FsError::Io`] naming the step that failed
    pub fn revert(&self, file: &Path) -> FsResult<Reverted> {
        let (userspace, dotfile) = self.pair_for(file)?;
        if !paths::exists(&dotfile) {
            return Err(FsError::DotfileMissing(dotfile));
        }
        if !paths::is_symlink(&userspace)? {
            return Err(FsError::SymlinkMissing(userspace));
        }
        if let Ok(current) = std::fs::read_link(&userspace)
            && current != dotfile
        {
            tracing::warn!(
                "{} points to {}, not {}",
                userspace.display(),
                current.display(),
                dotfile.display()
            );
        }

        let backup = self.backups.backup_file(&dotfile)?;
        delete_file_or_dir(&userspace)?;
        copy_file_or_dir(&dotfile, &userspace)?;
        delete_file_or_dir(&dotfile)?;
        tracing::debug!("restored {} from {}", userspace.display(), dotfile.display());

        Ok(Reverted {
            userspace,
            dotfile,
            backup,
        })
    }
}
