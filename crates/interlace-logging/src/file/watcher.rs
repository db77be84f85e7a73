//! File watcher that reloads the log filter when its file changes.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which replace the file on save are still observed. Debounced
//! events are forwarded to a reload thread owned by the [`Watcher`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

use super::LoggingFileConfig;
use crate::{LOGGING_TARGET, LoggingError, SHUTDOWN_GRACE};

const JOIN_POLL: Duration = Duration::from_millis(25);

pub(super) struct Watcher {
    debouncer: Debouncer<RecommendedWatcher>,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Watcher")
            .field("stopping", &self.shutdown.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub(super) fn spawn(path: PathBuf, debounce: Duration) -> Result<Self, LoggingError> {
        let watch_error = |source| LoggingError::Watch {
            path: path.clone(),
            source,
        };
        let (sender, receiver) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, sender).map_err(watch_error)?;
        debouncer
            .watcher()
            .watch(watched_directory(&path), RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let join = thread::Builder::new()
            .name("interlace-logging-watch".to_owned())
            .spawn(move || reload_on_change(&path, &receiver, debounce, &flag))
            .map_err(LoggingError::Watcher)?;
        Ok(Self {
            debouncer,
            shutdown,
            join,
        })
    }

    /// Stops watching and waits for the reload thread up to
    /// [`SHUTDOWN_GRACE`].
    pub(super) fn stop(self) {
        let Self {
            debouncer,
            shutdown,
            join,
        } = self;
        drop(debouncer);
        shutdown.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !join.is_finished() {
            if Instant::now() >= deadline {
                tracing::warn!(
                    target: LOGGING_TARGET,
                    grace_ms = SHUTDOWN_GRACE.as_millis(),
                    "logging watcher did not stop in time; detaching"
                );
                return;
            }
            thread::sleep(JOIN_POLL);
        }
        if join.join().is_err() {
            tracing::warn!(target: LOGGING_TARGET, "logging watcher panicked");
        }
    }
}

fn watched_directory(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn touches(events: &[notify_debouncer_mini::DebouncedEvent], path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    events
        .iter()
        .any(|event| event.path.file_name() == Some(name))
}

fn reload_on_change(
    path: &Path,
    events: &Receiver<DebounceEventResult>,
    tick: Duration,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match events.recv_timeout(tick) {
            Ok(Ok(batch)) if touches(&batch, path) => reload(path),
            Ok(Ok(_)) | Err(RecvTimeoutError::Timeout) => {}
            Ok(Err(error)) => tracing::warn!(
                target: LOGGING_TARGET,
                path = %path.display(),
                %error,
                "logging watcher reported an error"
            ),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn reload(path: &Path) {
    match LoggingFileConfig::read(path).and_then(|config| config.apply()) {
        Ok(()) => tracing::info!(
            target: LOGGING_TARGET,
            path = %path.display(),
            "logging configuration reloaded"
        ),
        Err(error) => tracing::warn!(
            target: LOGGING_TARGET,
            path = %path.display(),
            %error,
            "logging configuration reload failed"
        ),
    }
}
