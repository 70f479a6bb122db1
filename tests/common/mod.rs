// Shared helpers for integration tests.
//
// Provides a temporary sandbox holding a userspace root, a sync directory
// with its dotfiles root, and a private backup area, so each integration
// test can run operations and commands without touching the real home
// directory.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotsync::cli::{self, Cli};
use dotsync::operations::DotfileOps;
use dotsync::resources::backup::BackupArea;

/// An isolated userspace/dotfiles pair backed by a [`tempfile::TempDir`].
pub struct Sandbox {
    /// Temporary directory holding everything below.
    pub root: tempfile::TempDir,
    /// Userspace root (`<tmp>/home`).
    pub userspace: PathBuf,
    /// Sync directory (`<tmp>/sync`).
    pub sync_dir: PathBuf,
    /// Dotfiles root (`<tmp>/sync/dotfiles`).
    pub dotfiles: PathBuf,
    /// Backup area (`<tmp>/backups`).
    pub backups: PathBuf,
}

impl Sandbox {
    /// Create the sandbox with empty userspace and dotfiles roots.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let userspace = root.path().join("home");
        let sync_dir = root.path().join("sync");
        let dotfiles = sync_dir.join("dotfiles");
        let backups = root.path().join("backups");
        std::fs::create_dir_all(&userspace).expect("create userspace");
        std::fs::create_dir_all(&dotfiles).expect("create dotfiles");
        Self {
            root,
            userspace,
            sync_dir,
            dotfiles,
            backups,
        }
    }

    /// Operations on the sandbox roots, backing up into the sandbox.
    pub fn ops(&self) -> DotfileOps {
        DotfileOps::new(&self.userspace, &self.dotfiles)
            .expect("build operations")
            .with_backups(BackupArea::new(&self.backups))
    }

    /// Write `contents` to `rel` under the userspace root.
    pub fn write_user(&self, rel: &str, contents: &str) -> PathBuf {
        write(&self.userspace.join(rel), contents)
    }

    /// Write `contents` to `rel` under the dotfiles root.
    pub fn write_dotfile(&self, rel: &str, contents: &str) -> PathBuf {
        write(&self.dotfiles.join(rel), contents)
    }

    /// Any path inside the sandbox.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Write a configuration file naming the sandbox roots and return its
    /// path. `extra` is appended verbatim.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let content = format!(
            "syncdir = {}\n\
             dotfilesdir = dotfiles\n\
             userspacedir = {}\n\
             syncinterval = 60\n\
             {extra}",
            self.sync_dir.display(),
            self.userspace.display(),
        );
        write(&self.path("config"), &content)
    }

    /// Parse a command line run against the sandbox configuration.
    pub fn cli(&self, args: &[&str]) -> Cli {
        let config = self.write_config("");
        let mut argv: Vec<String> = vec![
            "dotsync".to_string(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        argv.extend(args.iter().map(ToString::to_string));
        cli::try_parse(argv).expect("parse command line")
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write(path: &Path, contents: &str) -> PathBuf {
    std::fs::create_dir_all(path.parent().expect("path has a parent")).expect("create parent");
    std::fs::write(path, contents).expect("write file");
    path.to_path_buf()
}

/// Read a file to a string, panicking with the path on failure.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
