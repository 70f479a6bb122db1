use std::path::Path;

use super::{DotfileOps, Linked};
use crate::error::{FsError, FsResult};
use crate::paths;
use crate::resources::ResourceChange;
use crate::resources::fs::{copy_file_or_dir, delete_file_or_dir};
use crate::resources::symlink::create_symlink;

impl DotfileOps {
    /// Move a userspace file or directory into the dotfiles tree and leave a
    /// symlink to it in its place.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `file` does not exist
    /// - [`FsError::PrefixMismatch`] if `file` is not under the userspace root
    /// - [`FsError::AlreadyExists`] if the dotfile already exists
    /// - [`FsError::Io`] naming the step that failed
    pub fn add(&self, file: &Path) -> FsResult<Linked> {
        let userspace = paths::to_absolute(file)?;
        if userspace.starts_with(&self.dotfiles_root) {
            return Err(FsError::PrefixMismatch {
                path: userspace,
                root: self.userspace_root.clone(),
            });
        }
        let dotfile = paths::replace_prefix(&userspace, &self.userspace_root, &self.dotfiles_root)?;
        if paths::exists(&dotfile) {
            return Err(FsError::AlreadyExists(dotfile));
        }

        let backup = self.backups.backup_file(&userspace)?;
        copy_file_or_dir(&userspace, &dotfile)?;
        tracing::debug!("copied {} to {}", userspace.display(), dotfile.display());
        delete_file_or_dir(&userspace)?;
        create_symlink(&userspace, &dotfile)?;

        Ok(Linked {
            userspace,
            dotfile,
            backup: Some(backup),
            change: ResourceChange::Applied,
        })
    }
}
