//! `watch` command: sync in the foreground every `syncinterval` seconds.
use std::sync::mpsc;

use anyhow::{Context as _, Result, bail};

use crate::config::Config;
use crate::logging::Logger;
use crate::sync::Syncer;
use crate::worker::IntervalWorker;

/// Sync now, then every configured interval until Ctrl-C.
///
/// # Errors
///
/// Returns an error if autosync is disabled or the worker cannot start.
/// Failed syncs are logged and retried on the next tick.
pub fn run(config: &Config, log: &Logger) -> Result<()> {
    if !config.auto_sync {
        bail!("autosync is disabled; add `autosync` to the configuration to use watch");
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        tx.send(()).ok();
    })
    .context("installing Ctrl-C handler")?;

    let worker = worker_for(config, super::sync::syncer_for(config), log.clone());
    log.stage(&format!(
        "Watching {} every {}s (Ctrl-C to stop)",
        config.sync_dir.display(),
        config.sync_interval_secs
    ));
    worker.run_now();
    worker.start().context("starting sync worker")?;

    rx.recv().ok();
    log.stage("Stopping");
    worker.stop();
    log.info(&summary(&worker));
    Ok(())
}

/// One-line account of what the worker did.
fn summary(worker: &IntervalWorker) -> String {
    match worker.skipped() {
        0 => format!("{} sync(s) run", worker.runs()),
        skipped => format!(
            "{} sync(s) run, {skipped} tick(s) skipped while a sync was in flight",
            worker.runs()
        ),
    }
}

/// Worker that runs `syncer` every configured interval, logging each result.
#[must_use]
pub fn worker_for(config: &Config, syncer: Syncer, log: Logger) -> IntervalWorker {
    IntervalWorker::new(config.sync_interval(), move || match syncer.run() {
        Ok(report) => {
            log.debug(&format!("states: {report}"));
            log.info(&format!(
                "synced at {}",
                chrono::Local::now().format("%H:%M:%S")
            ));
        }
        Err(e) => log.error(&format!("{}: {e}", e.kind())),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::scripted::ScriptedExecutor;
    use crate::sync::vcs::GitAdapter;
    use std::sync::Arc;

    fn config(extra: &str) -> Config {
        format!(
            "syncdir = /srv/sync\ndotfilesdir = files\nuserspacedir = /home/me\nsyncinterval = 3600\n{extra}"
        )
        .parse()
        .unwrap()
    }

    #[test]
    fn requires_autosync() {
        let err = run(&config(""), &Logger::new("test")).unwrap_err();
        assert!(err.to_string().contains("autosync is disabled"));
    }

    #[test]
    fn worker_runs_sync_and_survives_failures() {
        let executor = Arc::new(
            ScriptedExecutor::new()
                .then("git fetch", 0, "")
                .then("git status", 0, "nothing to commit, working tree clean\n")
                .then("git status", 0, "nothing to commit, working tree clean\n")
                .then("git pull", 0, "Already up to date.\n"),
        );
        let syncer = Syncer::new(
            "/srv/sync",
            executor.clone(),
            Arc::new(GitAdapter::new("master")),
        );
        let worker = worker_for(&config("autosync\n"), syncer, Logger::new("test"));

        assert!(worker.run_now());
        assert_eq!(executor.remaining(), 0);
        // The script is exhausted, so this sync fails; the worker keeps going.
        assert!(worker.run_now());
        assert_eq!(worker.runs(), 2);
    }

    #[test]
    fn summary_counts_runs() {
        let worker = IntervalWorker::new(std::time::Duration::from_secs(3600), || {});
        assert!(worker.run_now());
        assert!(worker.run_now());
        assert_eq!(summary(&worker), "2 sync(s) run");
    }

    #[test]
    fn summary_mentions_skipped_ticks() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = std::sync::Mutex::new(release_rx);
        let worker = Arc::new(IntervalWorker::new(
            std::time::Duration::from_secs(3600),
            move || {
                entered_tx.send(()).ok();
                release_rx.lock().unwrap().recv().ok();
            },
        ));
        let first = {
            let worker = Arc::clone(&worker);
            std::thread::spawn(move || worker.run_now())
        };
        entered_rx.recv().unwrap();

        assert!(!worker.run_now());
        release_tx.send(()).unwrap();
        first.join().unwrap();

        assert_eq!(
            summary(&worker),
            "1 sync(s) run, 1 tick(s) skipped while a sync was in flight"
        );
    }
}
