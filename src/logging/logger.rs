//! The logging handle passed to commands.
use std::path::{Path, PathBuf};

use super::subscriber::STAGE_TARGET;
use super::utils::log_file_path;

/// Logging handle for one command run.
///
/// Every call is a single [`tracing`] event emitted inside the run's
/// `command` span, so `DOTSYNC_LOG=[command{name=watch}]=debug` narrows the
/// console to one command. Rendering is left to the layers
/// [`init_subscriber`] installed. Clones share the span, so the watch
/// worker can take its own copy.
///
/// Creating a logger has no side effects on disk.
///
/// [`init_subscriber`]: super::init_subscriber
#[derive(Debug, Clone)]
pub struct Logger {
    span: tracing::Span,
    log_file: PathBuf,
}

impl Logger {
    /// Logger for a run of `command`. Create it after [`init_subscriber`],
    /// otherwise the span is disabled.
    ///
    /// [`init_subscriber`]: super::init_subscriber
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            span: tracing::info_span!("command", name = command),
            log_file: log_file_path(command),
        }
    }

    #[cfg(test)]
    pub(crate) fn at(log_file: PathBuf) -> Self {
        Self {
            span: tracing::info_span!("command", name = "test"),
            log_file,
        }
    }

    /// Where this run's log file is written, if the subscriber opened it.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        Some(self.log_file.as_path()).filter(|p| p.is_file())
    }

    /// Report a failure.
    pub fn error(&self, msg: &str) {
        self.span.in_scope(|| tracing::error!("{msg}"));
    }

    /// Report something the user should look at.
    pub fn warn(&self, msg: &str) {
        self.span.in_scope(|| tracing::warn!("{msg}"));
    }

    /// Start a new stage of the command.
    pub fn stage(&self, msg: &str) {
        self.span.in_scope(|| tracing::info!(target: STAGE_TARGET, "{msg}"));
    }

    /// Report progress.
    pub fn info(&self, msg: &str) {
        self.span.in_scope(|| tracing::info!("{msg}"));
    }

    /// Detail shown on the console only with `--verbose`; always in the file.
    pub fn debug(&self, msg: &str) {
        self.span.in_scope(|| tracing::debug!("{msg}"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::{CapturedLog, TEST_ENV_MUTEX};

    #[test]
    fn file_starts_with_run_header() {
        let captured = CapturedLog::new();
        assert!(captured.log.log_path().unwrap().is_file());
        assert!(captured.contents().starts_with("# dotsync "));
        assert!(captured.contents().lines().next().unwrap().contains(" test started "));
    }

    #[test]
    fn every_level_reaches_the_file() {
        let captured = CapturedLog::new();
        captured.log.debug("relinked .bashrc");
        captured.log.info("pulled 2 commits");
        captured.log.warn("no userspace entry for .vimrc");
        captured.log.error("merge conflict in /sync");
        let contents = captured.contents();
        assert!(contents.contains(" DEBUG relinked .bashrc"));
        assert!(contents.contains(" INFO  pulled 2 commits"));
        assert!(contents.contains(" WARN  no userspace entry for .vimrc"));
        assert!(contents.contains(" ERROR merge conflict in /sync"));
    }

    #[test]
    fn stage_is_written_as_header() {
        let captured = CapturedLog::new();
        captured.log.stage("Syncing /sync");
        assert!(captured.contents().contains(" ==> Syncing /sync"));
    }

    #[test]
    fn clones_share_the_file() {
        let captured = CapturedLog::new();
        let copy = captured.log.clone();
        copy.info("from the clone");
        assert_eq!(copy.log_path(), captured.log.log_path());
        assert!(captured.contents().contains("from the clone"));
    }

    #[test]
    fn events_are_emitted_inside_the_command_span() {
        let captured = CapturedLog::new();
        let log = Logger::at(captured.log.log_path().unwrap().to_path_buf());
        assert!(!log.span.is_disabled());
        assert_eq!(log.span.metadata().map(tracing::Metadata::name), Some("command"));
        log.info("inside");
        assert!(captured.contents().contains(" INFO  inside"));
    }

    #[test]
    #[allow(unsafe_code)]
    fn new_logger_touches_nothing_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let _lock = TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: Protected by TEST_ENV_MUTEX; restored before lock is released.
        unsafe {
            std::env::set_var("XDG_CACHE_HOME", tmp.path());
        }
        let log = Logger::new("add");
        // SAFETY: as above.
        unsafe {
            std::env::remove_var("XDG_CACHE_HOME");
        }
        assert!(!tmp.path().join("dotsync").exists());
        assert_eq!(log.log_path(), None);
    }
}
