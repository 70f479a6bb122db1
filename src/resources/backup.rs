//! Scratch-area backups taken before any destructive step.
use std::path::{Component, Path, PathBuf};

use crate::error::{FsError, FsResult};

/// Default location of the backup area.
pub const DEFAULT_BACKUP_ROOT: &str = "/tmp/dotsync/backups";

/// Out-of-tree scratch directory mirroring the absolute paths of backed-up
/// files.
///
/// Backups are not indexed; a later backup of the same path replaces the
/// earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArea {
    root: PathBuf,
}

impl Default for BackupArea {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_ROOT)
    }
}

impl BackupArea {
    /// Use `root` as the backup area.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the backup area.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a backup of `path` is stored: the backup root joined with the
    /// absolute path minus its root component.
    #[must_use]
    pub fn backup_path_for(&self, path: &Path) -> PathBuf {
        let rel: PathBuf = path
            .components()
            .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
            .collect();
        self.root.join(rel)
    }

    /// Copy `path` into the backup area, replacing any previous backup of the
    /// same path. `path` itself is never modified.
    ///
    /// Returns the location of the backup.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if `path` does not exist, or an
    /// [`FsError::Io`] with step `"back up"` if copying fails.
    pub fn backup_file(&self, path: &Path) -> FsResult<PathBuf> {
        let dst = self.backup_path_for(path);
        if crate::paths::exists(&dst) {
            super::fs::delete_file_or_dir(&dst).map_err(as_backup_step)?;
        }
        super::fs::copy_file_or_dir(path, &dst).map_err(as_backup_step)?;
        tracing::debug!("backed up {} to {}", path.display(), dst.display());
        Ok(dst)
    }
}

fn as_backup_step(err: FsError) -> FsError {
    match err {
        FsError::Io { path, source, .. } => FsError::Io {
            step: "back up",
            path,
            source,
        },
        other => other,
    }
}
