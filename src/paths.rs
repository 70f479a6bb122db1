//! Path mapping between the userspace and dotfiles trees.
//!
//! All comparisons are lexical: roots are never canonicalised and symlinks
//! are never followed, so a path that *is* a symlink is reported as one
//! rather than as whatever it points at.
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{FsError, FsResult};

/// What a path refers to, determined without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A regular file.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link, regardless of what (if anything) it points at.
    Symlink,
    /// Nothing exists at the path.
    Missing,
}

impl FileKind {
    /// Inspect `path` with a link-level stat.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Stat`] if the path cannot be inspected for a reason
    /// other than not existing.
    pub fn of(path: &Path) -> FsResult<Self> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => Ok(Self::Symlink),
            Ok(meta) if meta.is_dir() => Ok(Self::Directory),
            Ok(_) => Ok(Self::Regular),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::Missing),
            Err(source) => Err(FsError::Stat {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Expand a leading `~/` (or a bare `~`) to the current user's home
/// directory. Other paths are returned unchanged.
///
/// # Errors
///
/// Returns [`FsError::NoHome`] if the path needs expanding and the home
/// directory cannot be determined.
pub fn expand_tilde(path: &Path) -> FsResult<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    // `Path::strip_prefix` matches whole components, so `~user/x` is left alone.
    let home = dirs::home_dir().ok_or(FsError::NoHome)?;
    Ok(if rest.as_os_str().is_empty() {
        home
    } else {
        home.join(rest)
    })
}

/// Remove `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if at_root {
                    if !path.is_absolute() {
                        out.push("..");
                    }
                } else if out.components().next_back() == Some(Component::ParentDir) {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Make `path` absolute: expand `~/`, join relative paths onto the current
/// directory and normalise lexically. Does not require the path to exist.
///
/// # Errors
///
/// Returns an error if the home or current directory cannot be determined.
pub fn absolutize(path: &Path) -> FsResult<PathBuf> {
    let expanded = expand_tilde(path)?;
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| FsError::io("resolve current directory for", path, e))?;
        cwd.join(expanded)
    };
    Ok(normalize(&joined))
}

/// Make `path` absolute and require that something exists there.
///
/// A dangling symlink counts as existing.
///
/// # Errors
///
/// Returns [`FsError::NotFound`] if nothing exists at the resulting path, or
/// [`FsError::Stat`] if it cannot be inspected.
pub fn to_absolute(path: &Path) -> FsResult<PathBuf> {
    let abs = absolutize(path)?;
    match FileKind::of(&abs)? {
        FileKind::Missing => Err(FsError::NotFound(abs)),
        _ => Ok(abs),
    }
}

/// Translate `path` from under `old_root` to the same relative location
/// under `new_root`.
///
/// # Errors
///
/// Returns [`FsError::PrefixMismatch`] if `path` is not lexically under
/// `old_root`.
pub fn replace_prefix(path: &Path, old_root: &Path, new_root: &Path) -> FsResult<PathBuf> {
    let rel = path
        .strip_prefix(old_root)
        .map_err(|_| FsError::PrefixMismatch {
            path: path.to_path_buf(),
            root: old_root.to_path_buf(),
        })?;
    Ok(if rel.as_os_str().is_empty() {
        new_root.to_path_buf()
    } else {
        new_root.join(rel)
    })
}

/// Whether `path` is a symlink, without following it.
///
/// # Errors
///
/// Returns [`FsError::Stat`] if the path is inaccessible for a reason other
/// than not existing.
pub fn is_symlink(path: &Path) -> FsResult<bool> {
    Ok(FileKind::of(path)? == FileKind::Symlink)
}

/// Whether anything (including a dangling symlink) exists at `path`.
///
/// Inaccessible paths are reported as absent.
#[must_use]
pub fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Whether `a` and `b` name the same directory entry once symlinked
/// ancestors are resolved. The final component is never followed.
///
/// `false` when either parent directory cannot be resolved.
#[must_use]
pub fn same_entry(a: &Path, b: &Path) -> bool {
    let (Some(parent_a), Some(parent_b)) = (a.parent(), b.parent()) else {
        return false;
    };
    if a.file_name() != b.file_name() {
        return false;
    }
    match (std::fs::canonicalize(parent_a), std::fs::canonicalize(parent_b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
