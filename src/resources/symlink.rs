//! Symlink creation and the userspace-link resource.
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};
use crate::error::{FsError, FsResult};
use crate::paths::FileKind;

/// A userspace symlink that should point at a dotfile.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// Where the link lives (userspace side).
    pub link: PathBuf,
    /// What the link should point at (dotfiles side).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(link: PathBuf, target: PathBuf) -> Self {
        Self { link, target }
    }
}

impl Resource for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.target.display())
    }

    fn current_state(&self) -> FsResult<ResourceState> {
        if !crate::paths::exists(&self.target) {
            return Ok(ResourceState::Invalid {
                reason: format!("dotfile does not exist: {}", self.target.display()),
            });
        }

        match FileKind::of(&self.link)? {
            FileKind::Missing => Ok(ResourceState::Missing),
            FileKind::Symlink => {
                let existing = std::fs::read_link(&self.link)
                    .map_err(|e| FsError::io("read link", &self.link, e))?;
                if existing == self.target {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("points to {}", existing.display()),
                    })
                }
            }
            FileKind::Directory => Ok(ResourceState::Incorrect {
                current: "is a directory".to_string(),
            }),
            FileKind::Regular => Ok(ResourceState::Incorrect {
                current: "is a regular file".to_string(),
            }),
        }
    }

    /// Create the link. Anything already at `link` must have been removed by
    /// the caller.
    fn apply(&self) -> FsResult<ResourceChange> {
        super::fs::ensure_parent_dir(&self.link)?;
        create_symlink(&self.link, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

/// Create a symlink at `link` whose stored target is `target`, verbatim.
///
/// # Errors
///
/// Returns an [`FsError::Io`] if the link cannot be created (for example
/// because something already exists at `link`).
pub fn create_symlink(link: &Path, target: &Path) -> FsResult<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    #[cfg(not(any(unix, windows)))]
    let result: std::io::Result<()> = {
        let _ = target;
        Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
    };

    result.map_err(|e| FsError::io("create symlink", link, e))
}
