//! Errors raised by version-control backends.

use std::sync::Arc;

use thiserror::Error;

/// Errors arising from version-control operations.
#[derive(Debug, Error, Clone)]
pub enum VcsError {
    /// A required bootstrap property was not set.
    #[error("version control requires property '{key}'")]
    MissingProperty {
        /// Missing key.
        key: &'static str,
    },
    /// The backend executable could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// The backend command exited unsuccessfully.
    #[error("'{command}' failed with status {status:?}: {stderr}")]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Exit status code, if any.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The backend could not be constructed.
    #[error("version control backend '{name}' could not be constructed: {message}")]
    Construction {
        /// Implementation name.
        name: String,
        /// Failure description.
        message: String,
    },
}
