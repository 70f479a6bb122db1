//! Log file location and timestamps.
use std::path::PathBuf;

/// `$XDG_CACHE_HOME/dotsync`, falling back to the platform cache directory
/// and then to `./.cache/dotsync`. Not created here.
pub(super) fn cache_dir() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("dotsync")
}

/// `<cache dir>/<command>.log`.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    cache_dir().join(format!("{command}.log"))
}

/// Local wall-clock time with milliseconds, e.g. `2026-03-01 14:02:11.045`.
///
/// `watch` runs for hours, so file lines carry the date as well as the time.
pub(super) fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Whether console output may use colour. `NO_COLOR` set to anything
/// non-empty turns it off.
pub(super) fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
}
