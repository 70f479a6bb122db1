//! Console and log-file output.
//!
//! Everything is emitted through [`tracing`]; [`init_subscriber`] wires up
//! the console and the per-command log file, and [`Logger`] is the handle
//! commands use for their stage headers and messages.

mod logger;
mod subscriber;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;

/// Serializes `XDG_CACHE_HOME` manipulation across parallel test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// A [`Logger`] whose events land in a private log file for the current
/// thread only.
#[cfg(test)]
pub(crate) struct CapturedLog {
    pub(crate) log: Logger,
    _guard: tracing::dispatcher::DefaultGuard,
    _dir: tempfile::TempDir,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl CapturedLog {
    /// Point `XDG_CACHE_HOME` at a fresh temp dir just long enough to open
    /// the file layer, then install it as this thread's default dispatcher.
    pub(crate) fn new() -> Self {
        use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

        let dir = tempfile::tempdir().expect("create temp dir");
        let layer = {
            let _lock = TEST_ENV_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            // SAFETY: Protected by TEST_ENV_MUTEX; restored before lock is released.
            #[allow(unsafe_code)]
            unsafe {
                std::env::set_var("XDG_CACHE_HOME", dir.path());
            }
            let layer = subscriber::FileLayer::new("test");
            // SAFETY: as above.
            #[allow(unsafe_code)]
            unsafe {
                std::env::remove_var("XDG_CACHE_HOME");
            }
            layer.expect("open log file")
        };
        let dispatch = tracing::Dispatch::new(
            tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG)),
        );
        Self {
            log: Logger::at(dir.path().join("dotsync/test.log")),
            _guard: tracing::dispatcher::set_default(&dispatch),
            _dir: dir,
        }
    }

    /// Everything written to the log file so far.
    pub(crate) fn contents(&self) -> String {
        self.log
            .log_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .unwrap_or_default()
    }
}
