//! `setup` command: write a starting configuration, or prepare the
//! directories an existing one names.
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::exec::{self, Executor, ShellExecutor};
use crate::logging::Logger;

/// What `setup` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No configuration existed; the template was written.
    WroteTemplate,
    /// The dotfiles directory exists and the sync directory is a working copy.
    Ready,
    /// The dotfiles directory exists but syncing will not work yet.
    NotVersioned,
}

/// Run setup against the configuration file at `config_path`.
///
/// # Errors
///
/// Returns an error if the template cannot be written, the configuration is
/// invalid, or the dotfiles directory cannot be created.
pub fn run(config_path: &Path, log: &Logger) -> Result<()> {
    run_with(config_path, &ShellExecutor::for_vcs(), exec::which("git"), log).map(drop)
}

/// [`run`] with an explicit executor and knowledge of whether git is
/// installed.
///
/// # Errors
///
/// See [`run`].
pub fn run_with(
    config_path: &Path,
    executor: &dyn Executor,
    has_git: bool,
    log: &Logger,
) -> Result<Outcome> {
    if !config_path.exists() {
        write_template(config_path, log)?;
        return Ok(Outcome::WroteTemplate);
    }

    let config = super::load_config(config_path, log)?;
    log.stage("Preparing directories");
    fs::create_dir_all(&config.dotfiles_dir)
        .with_context(|| format!("creating {}", config.dotfiles_dir.display()))?;
    log.info(&format!("dotfiles in {}", config.dotfiles_dir.display()));

    if !has_git {
        log.warn("git not found on PATH; sync is unavailable");
        return Ok(Outcome::NotVersioned);
    }
    if !is_working_copy(&config, executor)? {
        log.warn(&format!(
            "{} is not a git working copy; clone your dotfiles repository there to enable sync",
            config.sync_dir.display()
        ));
        return Ok(Outcome::NotVersioned);
    }
    log.info(&format!("syncing {} on branch {}", config.sync_dir.display(), config.branch));
    Ok(Outcome::Ready)
}

fn write_template(config_path: &Path, log: &Logger) -> Result<()> {
    log.stage("Writing default configuration");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(config_path, Config::template())
        .with_context(|| format!("writing {}", config_path.display()))?;
    log.info(&format!(
        "wrote {}; review it and run setup again",
        config_path.display()
    ));
    Ok(())
}

fn is_working_copy(config: &Config, executor: &dyn Executor) -> Result<bool> {
    let result = executor
        .execute_with_match(
            &config.sync_dir,
            "git rev-parse --is-inside-work-tree",
            &["true"],
        )
        .context("checking sync directory")?;
    Ok(result.output.success() && result.matched)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::scripted::ScriptedExecutor;

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("config");
        let content = format!(
            "syncdir = {}\ndotfilesdir = dotfiles\nuserspacedir = {}\nsyncinterval = 60\n",
            dir.join("sync").display(),
            dir.join("home").display()
        );
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn writes_template_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dotsync/config");

        let outcome =
            run_with(&path, &ScriptedExecutor::new(), true, &Logger::new("test")).unwrap();

        assert_eq!(outcome, Outcome::WroteTemplate);
        assert_eq!(fs::read_to_string(&path).unwrap(), Config::template());
    }

    #[test]
    fn creates_dotfiles_dir_in_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());
        let executor = ScriptedExecutor::new().then("git rev-parse", 0, "true\n");

        let outcome = run_with(&path, &executor, true, &Logger::new("test")).unwrap();

        assert_eq!(outcome, Outcome::Ready);
        assert!(dir.path().join("sync/dotfiles").is_dir());
        assert_eq!(
            executor.calls(),
            vec!["git rev-parse --is-inside-work-tree".to_string()]
        );
    }

    #[test]
    fn warns_outside_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());
        let executor = ScriptedExecutor::new().then(
            "git rev-parse",
            128,
            "fatal: not a git repository (or any of the parent directories): .git\n",
        );

        let outcome = run_with(&path, &executor, true, &Logger::new("test")).unwrap();

        assert_eq!(outcome, Outcome::NotVersioned);
        assert!(dir.path().join("sync/dotfiles").is_dir());
    }

    #[test]
    fn skips_check_without_git() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());
        let executor = ScriptedExecutor::new();

        let outcome = run_with(&path, &executor, false, &Logger::new("test")).unwrap();

        assert_eq!(outcome, Outcome::NotVersioned);
        assert!(executor.calls().is_empty());
    }
}
