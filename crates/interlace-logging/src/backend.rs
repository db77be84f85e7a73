//! The trait every logging backend implements.

use std::fmt;

/// A runtime logging backend.
///
/// Initialisation methods report success as a `bool` and never return an
/// error: a backend that cannot configure itself logs the cause at `debug`
/// and leaves the current subscriber untouched.
pub trait LoggingBackend: Send + Sync {
    /// Stable backend name.
    fn name(&self) -> &'static str;

    /// Locates configuration using the backend's own rules and applies it.
    fn default_initialisation(&self) -> bool;

    /// Applies configuration from an explicit `file:` URL or path.
    fn initialise_from(&self, source: &str) -> bool;

    /// Stops any background activity. Calling it again has no effect.
    fn request_shutdown(&self);
}

impl fmt::Debug for dyn LoggingBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}
