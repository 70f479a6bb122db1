//! Dotfiles mirroring and sync engine.
//!
//! Keeps a user's configuration files in a version-controlled directory and
//! links them back into place, then keeps that directory in step with a
//! remote repository.
//!
//! The public API is organised into layers:
//!
//! - **[`paths`]**: path translation between the userspace and dotfiles trees
//! - **[`resources`]**: filesystem primitives, symlink state and the backup area
//! - **[`operations`]**: `add`, `install`, `revert`, `import_external` and
//!   `migrate_symlinks` on a pair of roots
//! - **[`exec`]** and **[`sync`]**: the shell executor and the remote-sync
//!   state machine driven through it
//! - **[`worker`]**: the interval worker behind `watch`
//! - **[`config`]**, **[`cli`]** and **[`commands`]**: the command-line tool
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod paths;
pub mod prompt;
pub mod resources;
pub mod sync;
pub mod worker;
