//! Subcommand implementations.
//!
//! Each command takes its collaborators (the [`DotfileOps`] roots, a
//! [`Syncer`](crate::sync::Syncer), a [`Confirm`] prompt) as arguments so
//! tests can drive it directly; [`run`] builds them from the parsed command
//! line and the configuration file.
pub mod add;
pub mod install;
pub mod migrate;
pub mod revert;
pub mod setup;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::ConfigError;
use crate::logging::Logger;
use crate::operations::DotfileOps;
use crate::prompt::{self, Confirm};

/// Resolve the configuration file: `explicit` if given, else the default
/// location.
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if there is no default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .ok_or(ConfigError::NoHome)
}

/// Load the configuration at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load_config(path: &Path, log: &Logger) -> Result<Config> {
    log.debug(&format!("loading configuration from {}", path.display()));
    let config = Config::load(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    log.debug(&format!(
        "sync dir {}, dotfiles dir {}, userspace dir {}",
        config.sync_dir.display(),
        config.dotfiles_dir.display(),
        config.userspace_dir.display()
    ));
    Ok(config)
}

/// Run the parsed command, prompting on stdin where a command asks for
/// confirmation.
///
/// # Errors
///
/// Returns the command's error unchanged apart from added context.
pub fn run(cli: &Cli, log: &Logger) -> Result<()> {
    run_with_prompt(cli, &mut prompt::stdio(), log)
}

/// Run the parsed command with an explicit prompt.
///
/// # Errors
///
/// Returns the command's error unchanged apart from added context.
pub fn run_with_prompt(cli: &Cli, prompt: &mut dyn Confirm, log: &Logger) -> Result<()> {
    let config_file = || config_path(cli.config.as_deref());
    let config = || -> Result<Config> { load_config(&config_file()?, log) };
    match &cli.command {
        Command::Migrate {
            dotfiles_dir,
            userspace_dir,
        } => migrate::run(dotfiles_dir, userspace_dir, log),
        Command::Setup => setup::run(&config_file()?, log),
        Command::Add { path } => add::run(&DotfileOps::from_config(&config()?), path, log),
        Command::Install { path, external } => install::run(
            &DotfileOps::from_config(&config()?),
            path,
            external.as_deref(),
            prompt,
            log,
        ),
        Command::Revert { path } => revert::run(&DotfileOps::from_config(&config()?), path, log),
        Command::Sync => sync::run(&sync::syncer_for(&config()?), log).map(drop),
        Command::Watch => watch::run(&config()?, log),
    }
}
