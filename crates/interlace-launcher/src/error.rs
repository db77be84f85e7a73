//! Errors surfaced by the launcher.

use std::io;
use std::sync::Arc;

use interlace_adapter::AdapterError;
use interlace_config::PropertiesError;
use interlace_logging::LoggingError;
use interlace_management::ManagementError;
use thiserror::Error;

use crate::LaunchMode;

/// Errors that abort a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Launcher settings could not be loaded.
    #[error("failed to load launcher settings: {0}")]
    Settings(Arc<ortho_config::OrthoError>),
    /// Launcher flags were malformed.
    #[error("{0}")]
    Usage(clap::Error),
    /// The bootstrap properties file could not be read.
    #[error(transparent)]
    Properties(#[from] PropertiesError),
    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Logging(#[from] LoggingError),
    /// A management component failed.
    #[error(transparent)]
    Management(#[from] ManagementError),
    /// Adapter configuration failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// No program is registered for the selected mode.
    #[error("no program is available for launch mode '{mode}'")]
    ProgramUnavailable {
        /// Selected mode.
        mode: LaunchMode,
    },
    /// A program was started without arguments it requires.
    #[error("{program} requires {expected}")]
    MissingArgument {
        /// Program name.
        program: &'static str,
        /// Description of the missing input.
        expected: &'static str,
    },
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),
    /// Writing program output failed.
    #[error("failed to write program output: {0}")]
    Output(#[source] io::Error),
}
