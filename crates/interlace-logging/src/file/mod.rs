//! Backend configured from an `interlace-logging` file next to the launcher.
//!
//! Discovery checks the working directory and then `./config`, preferring
//! the TOML form over the properties form in each directory. Once applied,
//! the file is watched for changes and its filter is reloaded in place.

mod watcher;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use interlace_config::{BootstrapProperties, DEFAULT_LOG_FILTER, LogFormat};
use serde::Deserialize;
use url::Url;

use self::watcher::Watcher;
use crate::backend::LoggingBackend;
use crate::subscriber::{bridge_log, install};
use crate::{LOGGING_TARGET, LoggingError};

/// Preferred logging configuration file name.
pub const TOML_CONFIG_NAME: &str = "interlace-logging.toml";

/// Fallback logging configuration file name.
pub const PROPERTIES_CONFIG_NAME: &str = "interlace-logging.properties";

const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);

/// Contents of a logging configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingFileConfig {
    /// `EnvFilter` directive.
    #[serde(default)]
    pub filter: Option<String>,
    /// Output format used when the subscriber is first installed.
    #[serde(default)]
    pub format: Option<LogFormat>,
}

impl LoggingFileConfig {
    /// Reads a `.toml` or `.properties` logging configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Read`] or [`LoggingError::Parse`].
    pub fn read(path: &Path) -> Result<Self, LoggingError> {
        let text = fs::read_to_string(path).map_err(|source| LoggingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| LoggingError::Parse {
            path: path.to_path_buf(),
            message,
        };
        if path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"))
        {
            return toml::from_str(&text).map_err(|error| parse_error(error.to_string()));
        }

        let properties = BootstrapProperties::parse(&text);
        let format = properties
            .get_non_blank("format")
            .map(str::parse::<LogFormat>)
            .transpose()
            .map_err(|error| parse_error(error.to_string()))?;
        Ok(Self {
            filter: properties.get_non_blank("filter").map(str::to_owned),
            format,
        })
    }

    /// Applies the configuration to the process subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError`] when the filter is invalid or cannot be
    /// installed.
    pub fn apply(&self) -> Result<(), LoggingError> {
        install(
            self.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER),
            self.format.unwrap_or_default(),
        )
    }
}

/// Returns the first logging configuration file found under `search_dirs`.
#[must_use]
pub fn discover(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .flat_map(|dir| [dir.join(TOML_CONFIG_NAME), dir.join(PROPERTIES_CONFIG_NAME)])
        .find(|candidate| candidate.is_file())
}

/// Converts a `file:` URL or plain path into a local path.
///
/// # Errors
///
/// Returns [`LoggingError::UnsupportedLocation`] for any other URL scheme or
/// a `file:` URL that does not name a local path.
pub fn source_path(source: &str) -> Result<PathBuf, LoggingError> {
    let unsupported = || LoggingError::UnsupportedLocation {
        location: source.to_owned(),
    };
    if source.starts_with("file:") {
        return Url::parse(source)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(unsupported);
    }
    if source.contains("://") {
        return Err(unsupported());
    }
    Ok(PathBuf::from(source))
}

/// Logging backend driven by a configuration file.
#[derive(Debug)]
pub struct FileBackend {
    search_dirs: Vec<PathBuf>,
    debounce: Duration,
    watcher: Mutex<Option<Watcher>>,
}

impl FileBackend {
    /// Builds a backend searching `search_dirs` in order.
    #[must_use]
    pub const fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            debounce: DEBOUNCE_INTERVAL,
            watcher: Mutex::new(None),
        }
    }

    /// Builds a backend searching the working directory, then `./config`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Self::default_search_dirs())
    }

    /// Directories searched by [`FileBackend::standard`].
    #[must_use]
    pub fn default_search_dirs() -> Vec<PathBuf> {
        vec![PathBuf::from("."), PathBuf::from("config")]
    }

    /// Overrides how long file events are coalesced before a reload.
    #[must_use]
    pub const fn with_debounce(mut self, interval: Duration) -> Self {
        self.debounce = interval;
        self
    }

    /// Reports whether a configuration file is discoverable.
    #[must_use]
    pub fn available(&self) -> bool {
        discover(&self.search_dirs).is_some()
    }

    /// Reports whether the configuration file is being watched.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher_slot().is_some()
    }

    fn watcher_slot(&self) -> MutexGuard<'_, Option<Watcher>> {
        self.watcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_and_watch(&self, path: PathBuf) -> Result<(), LoggingError> {
        LoggingFileConfig::read(&path)?.apply()?;
        tracing::info!(
            target: LOGGING_TARGET,
            path = %path.display(),
            "logging configuration applied"
        );
        let mut slot = self.watcher_slot();
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        *slot = Some(Watcher::spawn(path, self.debounce)?);
        Ok(())
    }

    fn report(outcome: Result<(), LoggingError>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(target: LOGGING_TARGET, %error, "file logging failed");
                false
            }
        }
    }
}

impl LoggingBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn default_initialisation(&self) -> bool {
        bridge_log();
        let Some(path) = discover(&self.search_dirs) else {
            tracing::debug!(target: LOGGING_TARGET, "no logging configuration file found");
            return false;
        };
        Self::report(self.apply_and_watch(path))
    }

    fn initialise_from(&self, source: &str) -> bool {
        bridge_log();
        Self::report(source_path(source).and_then(|path| self.apply_and_watch(path)))
    }

    fn request_shutdown(&self) {
        if let Some(watcher) = self.watcher_slot().take() {
            watcher.stop();
        }
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        self.request_shutdown();
    }
}
