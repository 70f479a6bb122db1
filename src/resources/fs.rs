//! Copy, delete and directory primitives shared by every dotfile operation.
use std::path::Path;

use crate::error::{FsError, FsResult};
use crate::paths::FileKind;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> FsResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| FsError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Copy a regular file, a directory tree or a symlink from `src` to `dst`.
///
/// Symlinks anywhere in the source subtree are recreated as symlinks with
/// the same stored target; they are never followed. Parent directories of
/// `dst` are created as needed.
///
/// # Errors
///
/// Returns [`FsError::NotFound`] if `src` does not exist, or an
/// [`FsError::Io`] naming the step and path that failed.
pub fn copy_file_or_dir(src: &Path, dst: &Path) -> FsResult<()> {
    ensure_parent_dir(dst)?;
    match FileKind::of(src)? {
        FileKind::Missing => Err(FsError::NotFound(src.to_path_buf())),
        FileKind::Symlink => copy_link(src, dst),
        FileKind::Regular => std::fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| FsError::io("copy", src, e)),
        FileKind::Directory => copy_dir_recursive(src, dst),
    }
}

fn copy_link(src: &Path, dst: &Path) -> FsResult<()> {
    let target = std::fs::read_link(src).map_err(|e| FsError::io("read link", src, e))?;
    super::symlink::create_symlink(dst, &target)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> FsResult<()> {
    std::fs::create_dir_all(dst).map_err(|e| FsError::io("create directory", dst, e))?;
    let entries = std::fs::read_dir(src).map_err(|e| FsError::io("read directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io("read directory", src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        // DirEntry::file_type does not follow symlinks.
        let file_type = entry
            .file_type()
            .map_err(|source| FsError::Stat {
                path: src_path.clone(),
                source,
            })?;
        if file_type.is_symlink() {
            copy_link(&src_path, &dst_path)?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).map_err(|e| FsError::io("copy", &src_path, e))?;
        }
    }
    Ok(())
}

/// Remove whatever is at `path`: a file, a symlink (never its target) or a
/// whole directory tree.
///
/// # Errors
///
/// Returns [`FsError::NotFound`] if nothing exists at `path`, or an
/// [`FsError::Io`] if removal fails.
pub fn delete_file_or_dir(path: &Path) -> FsResult<()> {
    match FileKind::of(path)? {
        FileKind::Missing => Err(FsError::NotFound(path.to_path_buf())),
        FileKind::Directory => {
            std::fs::remove_dir_all(path).map_err(|e| FsError::io("delete", path, e))
        }
        FileKind::Regular | FileKind::Symlink => {
            std::fs::remove_file(path).map_err(|e| FsError::io("delete", path, e))
        }
    }
}
