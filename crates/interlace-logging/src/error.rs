//! Errors raised by logging backends.

use std::path::PathBuf;

use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;

/// Errors raised while applying a logging configuration.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {message}")]
    Filter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// The global subscriber could not be installed.
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
    /// The active filter could not be swapped.
    #[error("failed to reload log filter: {0}")]
    Reload(String),
    /// A logging configuration file could not be read.
    #[error("failed to read logging configuration '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A logging configuration file held invalid content.
    #[error("invalid logging configuration '{path}': {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// A configuration location used a scheme other than `file:`.
    #[error("unsupported logging configuration location '{location}'")]
    UnsupportedLocation {
        /// Rejected location.
        location: String,
    },
    /// The configuration file could not be watched.
    #[error("failed to watch logging configuration '{path}': {source}")]
    Watch {
        /// File that was to be watched.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
    /// The file watcher thread could not be spawned.
    #[error("failed to spawn logging watcher: {0}")]
    Watcher(#[source] std::io::Error),
}
