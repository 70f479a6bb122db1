//! Dotfile operations: moving files between userspace and the dotfiles tree
//! while keeping the two trees mirrored.
//!
//! Every operation works against a pair of roots held by [`DotfileOps`]:
//! the userspace root (typically `~`) and the dotfiles root inside the sync
//! directory. For every non-directory entry under the dotfiles root the
//! mirrored userspace path is either a symlink pointing at it or absent.
//!
//! Steps within an operation run in order and abort on the first failure.
//! Completed steps are never rolled back; a copy is always taken into the
//! [`BackupArea`] before anything is deleted.
mod add;
mod import;
mod install;
mod migrate;
mod revert;

pub use import::{ImportKind, Imported};
pub use migrate::MigrationReport;
pub use revert::Reverted;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FsError, FsResult};
use crate::paths;
use crate::resources::ResourceChange;
use crate::resources::backup::BackupArea;

/// A userspace symlink created (or found) by `add` or `install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linked {
    /// Userspace path holding the symlink.
    pub userspace: PathBuf,
    /// Dotfile the symlink points at.
    pub dotfile: PathBuf,
    /// Backup taken before the userspace path was replaced, if any.
    pub backup: Option<PathBuf>,
    /// Whether anything was changed.
    pub change: ResourceChange,
}

/// The userspace and dotfiles roots an operation runs against.
#[derive(Debug, Clone)]
pub struct DotfileOps {
    userspace_root: PathBuf,
    dotfiles_root: PathBuf,
    backups: BackupArea,
}

impl DotfileOps {
    /// Build the operations for a pair of roots. Both are made absolute
    /// (expanding `~/`) but neither is required to exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if either root cannot be made absolute.
    pub fn new(userspace_root: &Path, dotfiles_root: &Path) -> FsResult<Self> {
        Ok(Self {
            userspace_root: paths::absolutize(userspace_root)?,
            dotfiles_root: paths::absolutize(dotfiles_root)?,
            backups: BackupArea::default(),
        })
    }

    /// Build the operations for the roots named in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            userspace_root: config.userspace_dir.clone(),
            dotfiles_root: config.dotfiles_dir.clone(),
            backups: BackupArea::default(),
        }
    }

    /// Use a different backup area.
    #[must_use]
    pub fn with_backups(mut self, backups: BackupArea) -> Self {
        self.backups = backups;
        self
    }

    /// Userspace root.
    #[must_use]
    pub fn userspace_root(&self) -> &Path {
        &self.userspace_root
    }

    /// Dotfiles root.
    #[must_use]
    pub fn dotfiles_root(&self) -> &Path {
        &self.dotfiles_root
    }

    /// Backup area used before destructive steps.
    #[must_use]
    pub const fn backups(&self) -> &BackupArea {
        &self.backups
    }

    /// Resolve `path`, given on either side, to its `(userspace, dotfile)`
    /// pair. The dotfiles root is checked first since it may itself live
    /// inside userspace.
    fn pair_for(&self, path: &Path) -> FsResult<(PathBuf, PathBuf)> {
        let abs = paths::absolutize(path)?;
        if abs.starts_with(&self.dotfiles_root) {
            let userspace =
                paths::replace_prefix(&abs, &self.dotfiles_root, &self.userspace_root)?;
            Ok((userspace, abs))
        } else if abs.starts_with(&self.userspace_root) {
            let dotfile = paths::replace_prefix(&abs, &self.userspace_root, &self.dotfiles_root)?;
            Ok((abs, dotfile))
        } else {
            Err(FsError::PrefixMismatch {
                path: abs,
                root: self.userspace_root.clone(),
            })
        }
    }
}
