//! Errors raised by management components and the object registry.

use std::net::SocketAddr;
use std::sync::Arc;

use interlace_config::ResolveError;
use thiserror::Error;

/// Errors arising from management operations.
#[derive(Debug, Error, Clone)]
pub enum ManagementError {
    /// An object name did not follow `domain:key=value[,key=value]`.
    #[error("malformed object name '{name}': {reason}")]
    MalformedObjectName {
        /// Rejected name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },
    /// An object is already registered under the name.
    #[error("object '{name}' is already registered")]
    AlreadyRegistered {
        /// Conflicting name.
        name: String,
    },
    /// No object is registered under the name.
    #[error("object '{name}' is not registered")]
    NotRegistered {
        /// Missing name.
        name: String,
    },
    /// A component selector named no built-in or registered component.
    #[error("unknown management component '{name}'")]
    UnknownComponent {
        /// Unrecognised selector token.
        name: String,
    },
    /// A lifecycle operation was invoked in the wrong state.
    #[error("cannot {operation} component '{component}' while {state}")]
    InvalidState {
        /// Component name.
        component: String,
        /// Rejected operation.
        operation: &'static str,
        /// Current lifecycle state.
        state: &'static str,
    },
    /// A service address was not of the form `tcp://host:port`.
    #[error("invalid service address '{address}': {reason}")]
    InvalidAddress {
        /// Rejected address.
        address: String,
        /// Why the address was rejected.
        reason: String,
    },
    /// A connector environment value could not be resolved.
    #[error("failed to resolve connector environment entry '{key}': {source}")]
    Environment {
        /// Environment key without its prefix.
        key: String,
        /// Resolver failure.
        #[source]
        source: ResolveError,
    },
    /// A listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address that could not be bound.
        address: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// A listener could not be prepared or spawned.
    #[error("listener setup failed for '{address}': {source}")]
    Listener {
        /// Configured address.
        address: String,
        /// Underlying IO error.
        #[source]
        source: Arc<std::io::Error>,
    },
}
