//! Interval worker for background autosync.
//!
//! Runs a job on a dedicated thread every `interval`. Runs never overlap: a
//! tick that arrives while the previous run is still in flight is skipped.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, TryLockError};
use std::thread::JoinHandle;
use std::time::Duration;

type Job = dyn Fn() + Send + Sync;

/// State shared between the worker handle and its thread.
struct Shared {
    job: Box<Job>,
    /// Set when the thread should exit.
    stop: Mutex<bool>,
    /// Notified when `stop` changes.
    wake: Condvar,
    /// Held for the duration of a run.
    in_flight: Mutex<()>,
    runs: AtomicUsize,
    skipped: AtomicUsize,
}

impl Shared {
    /// Run the job unless a run is already in flight. Returns whether it ran.
    fn tick(&self) -> bool {
        let guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::debug!("previous run still in flight, skipping tick");
                self.skipped.fetch_add(1, Ordering::SeqCst);
                return false;
            }
        };
        (self.job)();
        self.runs.fetch_add(1, Ordering::SeqCst);
        drop(guard);
        true
    }

    /// Block for `interval` or until asked to stop. Returns `true` to stop.
    fn wait(&self, interval: Duration) -> bool {
        let stopped = self.stop.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, interval, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }

    fn set_stop(&self, value: bool) {
        *self.stop.lock().unwrap_or_else(PoisonError::into_inner) = value;
        self.wake.notify_all();
    }
}

/// Periodically runs a job on a background thread.
pub struct IntervalWorker {
    interval: Duration,
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for IntervalWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalWorker")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .field("runs", &self.runs())
            .finish_non_exhaustive()
    }
}

impl IntervalWorker {
    /// Create a stopped worker that will run `job` every `interval`.
    pub fn new(interval: Duration, job: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            interval,
            shared: Arc::new(Shared {
                job: Box::new(job),
                stop: Mutex::new(false),
                wake: Condvar::new(),
                in_flight: Mutex::new(()),
                runs: AtomicUsize::new(0),
                skipped: AtomicUsize::new(0),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Start ticking. Does nothing if already started.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn start(&self) -> std::io::Result<()> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() {
            return Ok(());
        }
        self.shared.set_stop(false);
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let thread = std::thread::Builder::new()
            .name("dotsync-worker".to_string())
            .spawn(move || {
                while !shared.wait(interval) {
                    shared.tick();
                }
            })?;
        *handle = Some(thread);
        drop(handle);
        tracing::debug!("worker started, interval {:?}", self.interval);
        Ok(())
    }

    /// Stop ticking and wait for any in-flight run to finish. Does nothing if
    /// not started.
    pub fn stop(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(thread) = handle.take() else {
            return;
        };
        self.shared.set_stop(true);
        if thread.join().is_err() {
            tracing::warn!("worker thread panicked");
        }
        drop(handle);
        // A run started through `run_now` may still be in flight.
        drop(
            self.shared
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        tracing::debug!("worker stopped");
    }

    /// Run the job on the calling thread now, unless a run is already in
    /// flight. Returns whether it ran.
    pub fn run_now(&self) -> bool {
        self.shared.tick()
    }

    /// Whether the worker is started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of completed runs.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.shared.runs.load(Ordering::SeqCst)
    }

    /// Number of ticks skipped because a run was in flight.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.shared.skipped.load(Ordering::SeqCst)
    }
}

impl Drop for IntervalWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
