//! Waiting for process shutdown.

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::LaunchError;

/// Blocks a running program until it should shut down.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Signals`] when the listener cannot be set up.
    fn wait(&self) -> Result<(), LaunchError>;
}

/// Waits for `SIGTERM`, `SIGINT`, `SIGQUIT` or `SIGHUP`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), LaunchError> {
        let mut signals =
            Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP]).map_err(LaunchError::Signals)?;
        if let Some(signal) = signals.forever().next() {
            tracing::info!(target: crate::LAUNCHER_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}

/// Returns immediately; used when a program should run its startup and
/// teardown without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateShutdown;

impl ShutdownSignal for ImmediateShutdown {
    fn wait(&self) -> Result<(), LaunchError> {
        Ok(())
    }
}
