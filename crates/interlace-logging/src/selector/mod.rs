//! Memoized selection of the active logging backend.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::LOGGING_TARGET;
use crate::backend::LoggingBackend;
use crate::environment::EnvironmentBackend;
use crate::file::FileBackend;
use crate::noop::NoopBackend;

type Probe = Box<dyn Fn() -> bool + Send + Sync>;
type Constructor = Box<dyn Fn() -> Arc<dyn LoggingBackend> + Send + Sync>;

/// A named backend together with its availability probe and constructor.
pub struct BackendCandidate {
    name: String,
    probe: Probe,
    create: Constructor,
}

impl BackendCandidate {
    /// Builds a candidate from a cheap probe and a constructor.
    pub fn new<P, C>(name: impl Into<String>, probe: P, create: C) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        C: Fn() -> Arc<dyn LoggingBackend> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            probe: Box::new(probe),
            create: Box::new(create),
        }
    }

    /// Candidate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for BackendCandidate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BackendCandidate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Chooses and caches the logging backend.
#[derive(Debug)]
pub struct LoggingSelector {
    candidates: Vec<BackendCandidate>,
    selected: OnceCell<Arc<dyn LoggingBackend>>,
}

impl LoggingSelector {
    /// Builds a selector over an explicit, priority-ordered candidate list.
    #[must_use]
    pub fn with_candidates(candidates: Vec<BackendCandidate>) -> Self {
        Self {
            candidates,
            selected: OnceCell::new(),
        }
    }

    /// Builds a selector over `environment`, `file` and `noop`.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_candidates(vec![
            BackendCandidate::new("environment", EnvironmentBackend::available, || {
                Arc::new(EnvironmentBackend)
            }),
            BackendCandidate::new(
                "file",
                || FileBackend::standard().available(),
                || Arc::new(FileBackend::standard()),
            ),
            BackendCandidate::new("noop", || true, || Arc::new(NoopBackend)),
        ])
    }

    /// Names of the candidates in priority order.
    pub fn candidate_names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(BackendCandidate::name)
    }

    /// Returns the selected backend, choosing it on first access.
    ///
    /// Concurrent first callers block until a single selection completes.
    /// When no candidate is available a [`NoopBackend`] is returned.
    pub fn configurator(&self) -> Arc<dyn LoggingBackend> {
        Arc::clone(self.selected.get_or_init(|| self.select()))
    }

    /// Clears the cached selection and stops the previously selected backend.
    pub fn reset(&mut self) -> Option<Arc<dyn LoggingBackend>> {
        let previous = self.selected.take();
        if let Some(backend) = &previous {
            backend.request_shutdown();
        }
        previous
    }

    fn select(&self) -> Arc<dyn LoggingBackend> {
        for candidate in &self.candidates {
            if (candidate.probe)() {
                let backend = (candidate.create)();
                tracing::debug!(
                    target: LOGGING_TARGET,
                    backend = candidate.name(),
                    "logging backend selected"
                );
                return backend;
            }
        }
        tracing::debug!(target: LOGGING_TARGET, "no logging backend available");
        Arc::new(NoopBackend)
    }
}

impl Default for LoggingSelector {
    fn default() -> Self {
        Self::standard()
    }
}
