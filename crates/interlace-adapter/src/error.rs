//! Errors raised while building, persisting and replicating adapters.

use std::sync::Arc;

use interlace_management::ManagementError;
use interlace_vcs::VcsError;
use thiserror::Error;

use crate::ConfigLocation;

/// Errors arising from adapter configuration operations.
#[derive(Debug, Error, Clone)]
pub enum AdapterError {
    /// An operation that needs bootstrap properties ran before `configure`.
    #[error("configuration manager has not been configured")]
    NotConfigured,
    /// The configured adapter registry could not be built.
    #[error("failed to construct adapter registry '{name}': {message}")]
    RegistryConstruction {
        /// Requested implementation name.
        name: String,
        /// Failure description.
        message: String,
    },
    /// A configuration location used an unsupported scheme.
    #[error("unsupported configuration location '{location}'")]
    UnsupportedLocation {
        /// Rejected location.
        location: String,
    },
    /// A configuration location could not be parsed.
    #[error("invalid configuration location '{location}': {message}")]
    InvalidLocation {
        /// Rejected location.
        location: String,
        /// Parser message.
        message: String,
    },
    /// Reading or writing a configuration document failed.
    #[error("I/O error at '{location}': {source}")]
    Io {
        /// Location being accessed.
        location: ConfigLocation,
        /// Underlying IO error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// A document could not be marshalled or unmarshalled.
    #[error("failed to {operation} adapter definition as {format}: {message}")]
    Marshal {
        /// `marshal` or `unmarshal`.
        operation: &'static str,
        /// Document format.
        format: String,
        /// Serializer message.
        message: String,
    },
    /// A management registration failed.
    #[error(transparent)]
    Management(#[from] ManagementError),
    /// A version-control checkout or update failed.
    #[error(transparent)]
    VersionControl(#[from] VcsError),
    /// Replication stopped at a secondary location.
    #[error("replication to secondary {index} ('{location}') failed: {source}")]
    Replication {
        /// Zero-based position among the declared secondaries.
        index: usize,
        /// Secondary that failed, as declared.
        location: String,
        /// Failure that stopped replication.
        #[source]
        source: Box<AdapterError>,
    },
}
