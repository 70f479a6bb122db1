//! Configuration file loading and validation.
pub mod kv;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, FsError};
use crate::paths;

/// Branch synced when the configuration names none.
pub const DEFAULT_BRANCH: &str = "master";

const KEYS: &[&str] = &[
    "syncdir",
    "userspacedir",
    "dotfilesdir",
    "syncinterval",
    "autosync",
    "branch",
];

/// Loaded configuration. Every directory is absolute and normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Version-controlled working copy.
    pub sync_dir: PathBuf,
    /// Directory inside `sync_dir` mirroring `userspace_dir`.
    pub dotfiles_dir: PathBuf,
    /// Root of the user's configuration tree.
    pub userspace_dir: PathBuf,
    /// Seconds between automatic syncs.
    pub sync_interval_secs: u64,
    /// Whether automatic syncs are enabled.
    pub auto_sync: bool,
    /// Remote branch to sync with.
    pub branch: String,
}

impl Config {
    /// Default configuration file location, `~/.config/dotsync/config`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dotsync").join("config"))
    }

    /// Load and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or any
    /// validation error from [`Config::from_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Interval between automatic syncs.
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Commented default configuration written by `setup`.
    #[must_use]
    pub fn template() -> String {
        format!(
            "# dotsync configuration\n\
             \n\
             # Version-controlled working copy holding the dotfiles.\n\
             syncdir = ~/dotsync\n\
             \n\
             # Directory mirroring userspacedir, relative to syncdir.\n\
             dotfilesdir = dotfiles\n\
             \n\
             # Root of the tree the dotfiles are linked into.\n\
             userspacedir = ~/\n\
             \n\
             # Seconds between automatic syncs.\n\
             syncinterval = 300\n\
             \n\
             # Uncomment to let `dotsync watch` sync in the background.\n\
             # autosync\n\
             \n\
             # Remote branch to sync with.\n\
             branch = {DEFAULT_BRANCH}\n"
        )
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut values: HashMap<String, kv::Entry> = HashMap::new();
        for entry in kv::parse_from_str(content)? {
            if !KEYS.contains(&entry.key.as_str()) {
                return Err(malformed(entry.line, format!("unknown key '{}'", entry.key)));
            }
            if let Some(first) = values.get(&entry.key) {
                return Err(malformed(
                    entry.line,
                    format!("duplicate key '{}' (first set on line {})", entry.key, first.line),
                ));
            }
            if entry.value.as_deref() == Some("") {
                return Err(malformed(entry.line, format!("empty value for '{}'", entry.key)));
            }
            values.insert(entry.key.clone(), entry);
        }

        let sync_dir = absolute_dir(required(&values, "syncdir")?)?;
        let userspace_dir = absolute_dir(required(&values, "userspacedir")?)?;
        let dotfiles_dir = dotfiles_dir(required(&values, "dotfilesdir")?, &sync_dir)?;
        let sync_interval_secs = interval(required(&values, "syncinterval")?)?;
        let auto_sync = values.get("autosync").map_or(Ok(false), auto_sync)?;
        let branch = values
            .get("branch")
            .map_or_else(|| Ok(DEFAULT_BRANCH.to_string()), branch)?;

        Ok(Self {
            sync_dir,
            dotfiles_dir,
            userspace_dir,
            sync_interval_secs,
            auto_sync,
            branch,
        })
    }
}

fn malformed(line: usize, message: String) -> ConfigError {
    ConfigError::Malformed { line, message }
}

/// A required key with its value.
fn required<'a>(
    values: &'a HashMap<String, kv::Entry>,
    key: &'static str,
) -> Result<(usize, &'a str), ConfigError> {
    let entry = values.get(key).ok_or(ConfigError::MissingKey(key))?;
    let value = entry
        .value
        .as_deref()
        .ok_or_else(|| malformed(entry.line, format!("'{key}' needs a value")))?;
    Ok((entry.line, value))
}

fn expand(line: usize, value: &str) -> Result<PathBuf, ConfigError> {
    paths::expand_tilde(Path::new(value)).map_err(|e| match e {
        FsError::NoHome => ConfigError::NoHome,
        other => malformed(line, other.to_string()),
    })
}

fn absolute_dir((line, value): (usize, &str)) -> Result<PathBuf, ConfigError> {
    let path = expand(line, value)?;
    if !path.is_absolute() {
        return Err(malformed(
            line,
            format!("'{value}' must be absolute or start with ~/"),
        ));
    }
    Ok(paths::normalize(&path))
}

fn dotfiles_dir((line, value): (usize, &str), sync_dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = expand(line, value)?;
    let path = paths::normalize(&sync_dir.join(path));
    if path == sync_dir || !path.starts_with(sync_dir) {
        return Err(malformed(
            line,
            format!(
                "dotfilesdir '{value}' must be inside syncdir {}",
                sync_dir.display()
            ),
        ));
    }
    Ok(path)
}

fn interval((line, value): (usize, &str)) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(malformed(
            line,
            format!("syncinterval must be a positive number of seconds, got '{value}'"),
        )),
    }
}

fn auto_sync(entry: &kv::Entry) -> Result<bool, ConfigError> {
    let Some(value) = entry.value.as_deref() else {
        return Ok(true);
    };
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(malformed(
            entry.line,
            format!("autosync must be a boolean, got '{value}'"),
        )),
    }
}

fn branch(entry: &kv::Entry) -> Result<String, ConfigError> {
    let value = entry
        .value
        .as_deref()
        .ok_or_else(|| malformed(entry.line, "'branch' needs a value".to_string()))?;
    let valid = !value.starts_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-'));
    if valid {
        Ok(value.to_string())
    } else {
        Err(malformed(entry.line, format!("invalid branch name '{value}'")))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = "syncdir = /sync\n\
                           userspacedir = /home/me\n\
                           dotfilesdir = dotfiles\n\
                           syncinterval = 60\n";

    #[test]
    fn parses_minimal_config() {
        let config: Config = MINIMAL.parse().unwrap();
        assert_eq!(config.sync_dir, PathBuf::from("/sync"));
        assert_eq!(config.dotfiles_dir, PathBuf::from("/sync/dotfiles"));
        assert_eq!(config.userspace_dir, PathBuf::from("/home/me"));
        assert_eq!(config.sync_interval(), Duration::from_secs(60));
        assert!(!config.auto_sync);
        assert_eq!(config.branch, "master");
    }

    #[test]
    fn bare_autosync_enables() {
        let config: Config = format!("{MINIMAL}autosync\n").parse().unwrap();
        assert!(config.auto_sync);
    }

    #[test]
    fn autosync_false_disables() {
        let config: Config = format!("{MINIMAL}autosync = off\n").parse().unwrap();
        assert!(!config.auto_sync);
    }

    #[test]
    fn autosync_garbage_is_malformed() {
        let err = format!("{MINIMAL}autosync = maybe\n")
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 5, .. }));
    }

    #[test]
    fn absolute_dotfiles_dir_inside_syncdir() {
        let content = MINIMAL.replace("dotfilesdir = dotfiles", "dotfilesdir = /sync/files");
        let config: Config = content.parse().unwrap();
        assert_eq!(config.dotfiles_dir, PathBuf::from("/sync/files"));
    }

    #[test]
    fn dotfiles_dir_outside_syncdir_is_malformed() {
        let content = MINIMAL.replace("dotfilesdir = dotfiles", "dotfilesdir = /elsewhere");
        let err = content.parse::<Config>().unwrap_err();
        assert_eq!(err.kind(), "config-malformed");
        let content = MINIMAL.replace("dotfilesdir = dotfiles", "dotfilesdir = ../escape");
        assert!(content.parse::<Config>().is_err());
    }

    #[test]
    fn relative_syncdir_is_malformed() {
        let content = MINIMAL.replace("syncdir = /sync", "syncdir = sync");
        let err = content.parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));
    }

    #[test]
    fn tilde_dirs_are_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let content = MINIMAL
            .replace("syncdir = /sync", "syncdir = ~/dotsync")
            .replace("userspacedir = /home/me", "userspacedir = \"~/\"");
        let config: Config = content.parse().unwrap();
        assert_eq!(config.sync_dir, home.join("dotsync"));
        assert_eq!(config.dotfiles_dir, home.join("dotsync/dotfiles"));
        assert_eq!(config.userspace_dir, home);
    }

    #[test]
    fn missing_key_is_reported() {
        let content = MINIMAL.replace("syncinterval = 60\n", "");
        let err = content.parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("syncinterval")));
        assert_eq!(err.kind(), "config-missing-key");
    }

    #[test]
    fn unknown_key_is_malformed() {
        let err = format!("{MINIMAL}colour = blue\n")
            .parse::<Config>()
            .unwrap_err();
        assert_eq!(err.to_string(), "line 5: unknown key 'colour'");
    }

    #[test]
    fn duplicate_key_is_malformed() {
        let err = format!("{MINIMAL}SyncInterval = 30\n")
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 5, .. }));
    }

    #[test]
    fn empty_value_is_malformed() {
        let content = MINIMAL.replace("syncinterval = 60", "syncinterval =");
        assert!(content.parse::<Config>().is_err());
    }

    #[test]
    fn zero_interval_is_malformed() {
        let content = MINIMAL.replace("syncinterval = 60", "syncinterval = 0");
        let err = content.parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 4, .. }));
    }

    #[test]
    fn branch_is_validated() {
        let config: Config = format!("{MINIMAL}branch = release/1.x\n").parse().unwrap();
        assert_eq!(config.branch, "release/1.x");
        assert!(format!("{MINIMAL}branch = a;rm -rf\n").parse::<Config>().is_err());
        assert!(format!("{MINIMAL}branch = --force\n").parse::<Config>().is_err());
    }

    #[test]
    fn template_parses() {
        if dirs::home_dir().is_none() {
            return;
        }
        let config: Config = Config::template().parse().unwrap();
        assert_eq!(config.sync_interval_secs, 300);
        assert!(!config.auto_sync);
        assert_eq!(config.branch, DEFAULT_BRANCH);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config")).unwrap_err();
        assert_eq!(err.kind(), "config-read");
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(Config::load(&path).unwrap().sync_interval_secs, 60);
    }
}
