use std::path::Path;

use super::{DotfileOps, Linked};
use crate::error::{FsError, FsResult};
use crate::paths;
use crate::resources::fs::delete_file_or_dir;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Resource, ResourceChange, ResourceState};

impl DotfileOps {
    /// Link an existing dotfile into userspace.
    ///
    /// `file` may name either the userspace path or the dotfile. When
    /// something other than the correct symlink already occupies the
    /// userspace path it is only replaced if `overwrite` is set, after being
    /// backed up. A userspace path that already reaches the dotfile through a
    /// linked ancestor directory counts as installed and is never touched.
    ///
    /// # Errors
    ///
    /// - [`FsError::PrefixMismatch`] if `file` is under neither root
    /// - [`FsError::DotfileMissing`] if the dotfile does not exist
    /// - [`FsError::AbortOnOverwrite`] if the userspace path is occupied and
    ///   `overwrite` is `false`
    /// - [`FsError::Io`] naming the step that failed
    pub fn install(&self, file: &Path, overwrite: bool) -> FsResult<Linked> {
        let (userspace, dotfile) = self.pair_for(file)?;
        if !paths::exists(&dotfile) {
            return Err(FsError::DotfileMissing(dotfile));
        }

        // After `add ~/.config/nvim` the userspace file *is* the dotfile,
        // seen through the linked directory. Deleting it would delete the
        // dotfile.
        if paths::same_entry(&userspace, &dotfile) {
            tracing::debug!(
                "{} reaches {} through a linked directory",
                userspace.display(),
                dotfile.display()
            );
            return Ok(Linked {
                userspace,
                dotfile,
                backup: None,
                change: ResourceChange::AlreadyCorrect,
            });
        }

        let link = SymlinkResource::new(userspace, dotfile);
        let mut backup = None;
        match link.current_state()? {
            ResourceState::Correct => {
                tracing::debug!("already installed: {}", link.description());
                return Ok(Linked {
                    userspace: link.link,
                    dotfile: link.target,
                    backup,
                    change: ResourceChange::AlreadyCorrect,
                });
            }
            ResourceState::Missing => {}
            ResourceState::Incorrect { current } => {
                if !overwrite {
                    return Err(FsError::AbortOnOverwrite(link.link));
                }
                tracing::debug!("replacing {} ({current})", link.link.display());
                backup = Some(self.backups.backup_file(&link.link)?);
                delete_file_or_dir(&link.link)?;
            }
            ResourceState::Invalid { .. } => return Err(FsError::DotfileMissing(link.target)),
        }

        let change = link.apply()?;
        Ok(Linked {
            userspace: link.link,
            dotfile: link.target,
            backup,
            change,
        })
    }
}
