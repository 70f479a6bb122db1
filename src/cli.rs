//! Command-line surface.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser, Subcommand};

use crate::error::CliError;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dotsync",
    about = "Mirror dotfiles into a version-controlled directory and keep it in sync",
    version,
    disable_help_flag = true,
    subcommand_required = true
)]
pub struct Cli {
    #[command(subcommand)]
    #[allow(missing_docs)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.config/dotsync/config)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print help
    #[arg(short = 'h', long = "help", alias = "h", action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move a userspace file into the dotfiles tree and link it back
    Add {
        /// Userspace file or directory
        path: PathBuf,
    },
    /// Link a dotfile into userspace
    Install {
        /// Dotfile or its userspace location
        path: PathBuf,
        /// Import `path` from another dotfiles tree rooted at DIR first
        #[arg(long, value_name = "DIR")]
        external: Option<PathBuf>,
    },
    /// Replace a userspace link with a real copy and drop the dotfile
    Revert {
        /// Userspace link or its dotfile
        path: PathBuf,
    },
    /// Commit local changes and synchronise with the remote
    Sync,
    /// Repoint userspace links after the dotfiles tree moved
    Migrate {
        /// New dotfiles directory
        dotfiles_dir: PathBuf,
        /// Userspace directory
        userspace_dir: PathBuf,
    },
    /// Write a default configuration or prepare the sync directory
    Setup,
    /// Sync periodically until interrupted
    Watch,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Install { .. } => "install",
            Self::Revert { .. } => "revert",
            Self::Sync => "sync",
            Self::Migrate { .. } => "migrate",
            Self::Setup => "setup",
            Self::Watch => "watch",
        }
    }
}

/// Parse `args` (including the program name).
///
/// # Errors
///
/// Returns the raw clap error; use [`classify_clap_error`] to map it onto
/// the error taxonomy.
pub fn try_parse<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Map a clap error onto a [`CliError`].
///
/// Help and version display map to [`CliError::HelpRequested`]. An unexpected
/// positional argument is an argument-count error; an unexpected flag is a
/// parse error.
#[must_use]
pub fn classify_clap_error(err: &clap::Error) -> CliError {
    let message = first_line(&err.render().to_string());
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => CliError::HelpRequested,
        ErrorKind::InvalidSubcommand => CliError::UnknownCommand(message),
        ErrorKind::MissingRequiredArgument
        | ErrorKind::MissingSubcommand
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::WrongNumberOfValues
        | ErrorKind::TooManyValues
        | ErrorKind::TooFewValues => CliError::ArgumentCount(message),
        ErrorKind::UnknownArgument if is_positional(err) => CliError::ArgumentCount(message),
        _ => CliError::Parse(message),
    }
}

/// Whether the offending argument of `err` is a positional value.
fn is_positional(err: &clap::Error) -> bool {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => !arg.starts_with('-'),
        _ => false,
    }
}

fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}
