//! Traits implemented by version-control backends.

use std::path::Path;

use interlace_config::BootstrapProperties;

use crate::VcsError;

/// A version-control backend that keeps a local working copy current.
pub trait VersionControl: Send {
    /// Stable implementation name, for example `git`.
    fn implementation_name(&self) -> &str;

    /// Supplies the bootstrap properties the backend reads its settings from.
    fn set_bootstrap_properties(&mut self, properties: &BootstrapProperties);

    /// Brings an existing working copy up to date with its remote.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] when settings are missing or the operation fails.
    fn update(&self) -> Result<(), VcsError>;

    /// Creates the working copy from the remote.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] when settings are missing or the operation fails.
    fn checkout(&self) -> Result<(), VcsError>;

    /// Returns a read-only view over the working copy.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::MissingProperty`] when the working copy is not
    /// configured.
    fn api(&self, properties: &BootstrapProperties) -> Result<Box<dyn VcsApi>, VcsError>;
}

/// Read-only queries against a working copy.
pub trait VcsApi: Send {
    /// Location of the working copy.
    fn working_copy(&self) -> &Path;

    /// Identifier of the revision currently checked out.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] when the revision cannot be determined.
    fn current_revision(&self) -> Result<String, VcsError>;
}
