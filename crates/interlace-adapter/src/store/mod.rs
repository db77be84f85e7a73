//! Reading and writing adapter configuration documents.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{AdapterError, ConfigLocation};

/// Storage for adapter configuration documents.
pub trait ConfigStore: Send + Sync {
    /// Reads the document at `location`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the location is unsupported or the
    /// document cannot be read.
    fn read(&self, location: &ConfigLocation) -> Result<String, AdapterError>;

    /// Writes `contents` to `location`, replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the location is unsupported or the
    /// document cannot be written.
    fn write(&self, location: &ConfigLocation, contents: &str) -> Result<(), AdapterError>;
}

/// Store for local paths and `file:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigStore;

impl FileConfigStore {
    /// Creates the store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn local_path(location: &ConfigLocation) -> Result<PathBuf, AdapterError> {
        location
            .local_path()
            .ok_or_else(|| AdapterError::UnsupportedLocation {
                location: location.to_string(),
            })
    }
}

fn io_error(location: &ConfigLocation, source: io::Error) -> AdapterError {
    AdapterError::Io {
        location: location.clone(),
        source: Arc::new(source),
    }
}

impl ConfigStore for FileConfigStore {
    fn read(&self, location: &ConfigLocation) -> Result<String, AdapterError> {
        let path = Self::local_path(location)?;
        fs::read_to_string(&path).map_err(|source| io_error(location, source))
    }

    fn write(&self, location: &ConfigLocation, contents: &str) -> Result<(), AdapterError> {
        let path = Self::local_path(location)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(location, source))?;
        }
        fs::write(&path, contents).map_err(|source| io_error(location, source))?;
        tracing::debug!(
            target: crate::ADAPTER_TARGET,
            location = %location,
            bytes = contents.len(),
            "configuration document written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
