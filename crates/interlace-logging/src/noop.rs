//! Backend used when nothing else is available.

use crate::backend::LoggingBackend;
use crate::subscriber::bridge_log;

/// Fallback backend that leaves the launcher subscriber unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

impl LoggingBackend for NoopBackend {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn default_initialisation(&self) -> bool {
        bridge_log();
        true
    }

    fn initialise_from(&self, source: &str) -> bool {
        bridge_log();
        tracing::debug!(
            target: crate::LOGGING_TARGET,
            source,
            "noop logging backend ignores explicit configuration"
        );
        false
    }

    fn request_shutdown(&self) {}
}
