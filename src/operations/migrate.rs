use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::DotfileOps;
use crate::error::{FsError, FsResult};
use crate::paths::{self, FileKind};
use crate::resources::fs::delete_file_or_dir;
use crate::resources::symlink::create_symlink;

/// What `migrate_symlinks` did to each mirrored userspace path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Userspace symlinks recreated to point into the dotfiles tree.
    pub relinked: Vec<PathBuf>,
    /// Mirrored userspace paths that do not exist.
    pub missing: Vec<PathBuf>,
    /// Mirrored userspace paths left alone because they are not symlinks.
    pub untouched: Vec<PathBuf>,
}

impl DotfileOps {
    /// Re-point every userspace symlink mirroring an entry of the dotfiles
    /// tree at that entry, e.g. after the dotfiles directory was moved.
    ///
    /// The dotfiles tree is walked depth-first without following links.
    /// Userspace paths that are not symlinks are never modified. Once a
    /// directory's mirror has been relinked (or is missing) its children are
    /// not visited.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the dotfiles root does not exist
    /// - [`FsError::Io`] if the walk fails or a link cannot be replaced
    pub fn migrate_symlinks(&self) -> FsResult<MigrationReport> {
        let root = paths::to_absolute(&self.dotfiles_root)?;
        let mut report = MigrationReport::default();

        let mut walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| walk_error(&root, e))?;
            let dotfile = entry.path();
            let mirror = paths::replace_prefix(dotfile, &root, &self.userspace_root)?;
            let is_dir = entry.file_type().is_dir();

            match FileKind::of(&mirror)? {
                FileKind::Missing => {
                    tracing::warn!("no userspace entry for {}", dotfile.display());
                    report.missing.push(mirror);
                    if is_dir {
                        walker.skip_current_dir();
                    }
                }
                FileKind::Symlink => {
                    delete_file_or_dir(&mirror)?;
                    create_symlink(&mirror, dotfile)?;
                    tracing::debug!("relinked {} -> {}", mirror.display(), dotfile.display());
                    report.relinked.push(mirror);
                    if is_dir {
                        walker.skip_current_dir();
                    }
                }
                FileKind::Regular | FileKind::Directory => report.untouched.push(mirror),
            }
        }
        Ok(report)
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> FsError {
    let path = err.path().unwrap_or(root).to_path_buf();
    FsError::io("walk", path, err.into())
}
