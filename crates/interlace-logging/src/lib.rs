//! Runtime logging backend selection for the Interlace launcher.
//!
//! The launcher installs one global `tracing` subscriber early. A
//! [`LoggingSelector`] then probes the registered [`LoggingBackend`]
//! candidates in priority order and memoizes the first one that reports
//! itself available. Backends only ever swap the active filter through a
//! reload handle; the subscriber itself is installed at most once per
//! process.

mod backend;
mod environment;
mod error;
mod file;
mod noop;
mod selector;
mod subscriber;

pub use backend::LoggingBackend;
pub use environment::{ENV_FILTER_VAR, EnvironmentBackend};
pub use error::LoggingError;
pub use file::{
    FileBackend, LoggingFileConfig, PROPERTIES_CONFIG_NAME, TOML_CONFIG_NAME, discover,
    source_path,
};
pub use noop::NoopBackend;
pub use selector::{BackendCandidate, LoggingSelector};
pub use subscriber::{apply_filter, bridge_log, install};

pub(crate) const LOGGING_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::backend");

/// Longest time a backend waits for its background thread on shutdown.
pub const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(5);
