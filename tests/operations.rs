#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the dotfile operations and the commands wrapping
//! them: `add`, `revert`, `install` and `migrate` against a sandboxed
//! userspace and dotfiles tree.

mod common;

use std::os::unix::fs::symlink;
use std::path::Path;

use common::{Sandbox, read, write};
use dotsync::commands;
use dotsync::error::{FsError, classify};
use dotsync::logging::Logger;
use dotsync::operations::DotfileOps;
use dotsync::prompt::ReaderPrompt;
use dotsync::resources::backup::BackupArea;
use walkdir::WalkDir;

fn no_prompt() -> ReaderPrompt<&'static [u8], Vec<u8>> {
    ReaderPrompt::new(b"".as_slice(), Vec::new())
}

/// Every non-directory entry under the dotfiles root is either linked from
/// its userspace mirror (directly or through a linked parent directory) or
/// has no mirror at all.
fn assert_mirrored(sandbox: &Sandbox) {
    let mut walker = WalkDir::new(&sandbox.dotfiles).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&sandbox.dotfiles).unwrap();
        let mirror = sandbox.userspace.join(rel);
        let Ok(meta) = std::fs::symlink_metadata(&mirror) else {
            continue;
        };
        if meta.file_type().is_symlink() {
            assert_eq!(std::fs::read_link(&mirror).unwrap(), entry.path());
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
        } else {
            assert!(
                entry.file_type().is_dir(),
                "{} is not a link",
                mirror.display()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[test]
fn add_command_moves_file_and_backs_up_to_default_area() {
    let sandbox = Sandbox::new();
    let file = sandbox.write_user("sub/a.conf", "x");
    let cli = sandbox.cli(&["add", file.to_str().unwrap()]);

    commands::run_with_prompt(&cli, &mut no_prompt(), &Logger::new("test")).unwrap();

    let dotfile = sandbox.dotfiles.join("sub/a.conf");
    assert!(std::fs::symlink_metadata(&dotfile).unwrap().is_file());
    assert_eq!(read(&dotfile), "x");
    assert_eq!(std::fs::read_link(&file).unwrap(), dotfile);
    let backup = BackupArea::default().backup_path_for(&file);
    assert!(backup.starts_with("/tmp/dotsync/backups"));
    assert_eq!(read(&backup), "x");
}

#[test]
fn add_directory_links_whole_tree() {
    let sandbox = Sandbox::new();
    sandbox.write_user(".config/nvim/init.lua", "vim.o.nu = true");
    sandbox.write_user(".config/nvim/lua/plugins.lua", "return {}");
    let dir = sandbox.userspace.join(".config/nvim");

    let linked = sandbox.ops().add(&dir).unwrap();

    assert_eq!(linked.dotfile, sandbox.dotfiles.join(".config/nvim"));
    assert!(dir.is_symlink());
    assert_eq!(read(&dir.join("lua/plugins.lua")), "return {}");
    assert_mirrored(&sandbox);
}

#[test]
fn every_added_file_is_mirrored_by_a_link() {
    let sandbox = Sandbox::new();
    let ops = sandbox.ops();
    for rel in [".bashrc", ".config/fish/config.fish", ".local/bin/tool"] {
        let file = sandbox.write_user(rel, rel);
        ops.add(&file).unwrap();
    }
    sandbox.write_user(".config/untracked", "stays");

    assert_mirrored(&sandbox);
    assert_eq!(read(&sandbox.userspace.join(".local/bin/tool")), ".local/bin/tool");
}

#[test]
fn add_refuses_to_overwrite_dotfile() {
    let sandbox = Sandbox::new();
    let file = sandbox.write_user(".bashrc", "new");
    sandbox.write_dotfile(".bashrc", "old");

    let err = sandbox.ops().add(&file).unwrap_err();

    assert!(matches!(err, FsError::AlreadyExists(_)));
    assert_eq!(read(&file), "new");
    assert!(!file.is_symlink());
}

#[test]
fn add_outside_userspace_is_prefix_mismatch() {
    let sandbox = Sandbox::new();
    let file = write(&sandbox.path("elsewhere/f"), "f");
    let err = sandbox.ops().add(&file).unwrap_err();
    assert_eq!(err.kind(), "prefix-mismatch");
}

#[test]
fn add_missing_file_is_not_found() {
    let sandbox = Sandbox::new();
    let err = sandbox
        .ops()
        .add(&sandbox.userspace.join("nothing"))
        .unwrap_err();
    assert_eq!(err.kind(), "not-found");
}

// ---------------------------------------------------------------------------
// revert
// ---------------------------------------------------------------------------

#[test]
fn revert_undoes_add() {
    let sandbox = Sandbox::new();
    let file = sandbox.write_user("sub/a.conf", "original");
    let ops = sandbox.ops();
    ops.add(&file).unwrap();

    let reverted = ops.revert(&file).unwrap();

    assert!(!file.is_symlink());
    assert_eq!(read(&file), "original");
    assert!(!sandbox.dotfiles.join("sub/a.conf").exists());
    assert_eq!(read(&reverted.backup), "original");
}

#[test]
fn revert_by_dotfile_path() {
    let sandbox = Sandbox::new();
    let file = sandbox.write_user(".inputrc", "set bell-style none");
    let ops = sandbox.ops();
    let linked = ops.add(&file).unwrap();

    ops.revert(&linked.dotfile).unwrap();

    assert_eq!(read(&file), "set bell-style none");
}

#[test]
fn revert_command_reports_missing_dotfile() {
    let sandbox = Sandbox::new();
    let file = sandbox.write_user(".inputrc", "x");
    let cli = sandbox.cli(&["revert", file.to_str().unwrap()]);

    let err = commands::run_with_prompt(&cli, &mut no_prompt(), &Logger::new("test")).unwrap_err();

    let class = classify(&err);
    assert_eq!(class.kind, "dotfile-missing");
    assert!(!class.soft);
}

// ---------------------------------------------------------------------------
// install
// ---------------------------------------------------------------------------

#[test]
fn install_links_dotfile_into_empty_userspace() {
    let sandbox = Sandbox::new();
    let dotfile = sandbox.write_dotfile(".config/git/config", "[core]");

    let linked = sandbox.ops().install(&dotfile, false).unwrap();

    assert_eq!(linked.userspace, sandbox.userspace.join(".config/git/config"));
    assert_eq!(std::fs::read_link(&linked.userspace).unwrap(), dotfile);
    assert!(linked.backup.is_none());
    assert_mirrored(&sandbox);
}

#[test]
fn install_without_overwrite_is_soft_abort() {
    let sandbox = Sandbox::new();
    sandbox.write_dotfile("b.conf", "y");
    let existing = sandbox.write_user("b.conf", "z");

    let err = sandbox.ops().install(&existing, false).unwrap_err();

    assert_eq!(err.kind(), "abort-on-overwrite");
    assert!(err.is_soft());
    assert_eq!(read(&existing), "z");
}

// ---------------------------------------------------------------------------
// migrate
// ---------------------------------------------------------------------------

#[test]
fn migrate_after_move_repoints_links_and_keeps_files() {
    let sandbox = Sandbox::new();
    let old = sandbox.path("old");
    let new = sandbox.path("new");
    write(&old.join("x"), "x");
    write(&old.join("keep"), "tracked");
    symlink(old.join("x"), sandbox.userspace.join("x")).unwrap();
    let kept = sandbox.write_user("keep", "local");
    std::fs::rename(&old, &new).unwrap();

    let cli = sandbox.cli(&[
        "migrate",
        new.to_str().unwrap(),
        sandbox.userspace.to_str().unwrap(),
    ]);
    commands::run_with_prompt(&cli, &mut no_prompt(), &Logger::new("test")).unwrap();

    assert_eq!(
        std::fs::read_link(sandbox.userspace.join("x")).unwrap(),
        new.join("x")
    );
    assert_eq!(read(&kept), "local");
    assert!(!kept.is_symlink());
}

#[test]
fn migrate_reports_each_mirror_once() {
    let sandbox = Sandbox::new();
    sandbox.write_dotfile("a", "a");
    sandbox.write_dotfile("b", "b");
    sandbox.write_dotfile("c", "c");
    symlink("/gone/a", sandbox.userspace.join("a")).unwrap();
    sandbox.write_user("b", "mine");

    let report = sandbox.ops().migrate_symlinks().unwrap();

    assert_eq!(report.relinked, vec![sandbox.userspace.join("a")]);
    assert_eq!(report.untouched, vec![sandbox.userspace.join("b")]);
    assert_eq!(report.missing, vec![sandbox.userspace.join("c")]);
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[test]
fn import_confirm_only_plans() {
    let sandbox = Sandbox::new();
    let external = sandbox.path("external");
    let source = write(&external.join(".gitignore"), "target/");

    let err = sandbox
        .ops()
        .import_external(&source, &external, true)
        .unwrap_err();

    let planned = sandbox.dotfiles.join(".gitignore");
    assert!(matches!(&err, FsError::ConfirmProceed(p) if *p == planned));
    assert!(err.is_soft());
    assert!(!sandbox.dotfiles.join(".gitignore").exists());
}

#[test]
fn import_preserves_shared_store_links() {
    let sandbox = Sandbox::new();
    let external = sandbox.path("external");
    std::fs::create_dir_all(&external).unwrap();
    symlink("store/vimrc", external.join(".vimrc")).unwrap();

    let imported = sandbox
        .ops()
        .import_external(&external.join(".vimrc"), &external, false)
        .unwrap();

    assert_eq!(
        std::fs::read_link(&imported.destination).unwrap(),
        external.join("store/vimrc")
    );
}

#[test]
fn operations_use_independent_roots() {
    let a = Sandbox::new();
    let b = Sandbox::new();
    let ops = DotfileOps::new(&a.userspace, &b.dotfiles).unwrap();
    assert_eq!(ops.userspace_root(), a.userspace.as_path());
    assert_eq!(ops.dotfiles_root(), Path::new(&b.dotfiles));
}
