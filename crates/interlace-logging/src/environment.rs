//! Backend configured from the `RUST_LOG` environment variable.

use std::env;

use crate::backend::LoggingBackend;
use crate::file::{LoggingFileConfig, source_path};
use crate::subscriber::{apply_filter, bridge_log};
use crate::{LOGGING_TARGET, LoggingError};

/// Environment variable holding the filter directive.
pub const ENV_FILTER_VAR: &str = "RUST_LOG";

/// Backend that takes its filter from [`ENV_FILTER_VAR`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentBackend;

impl EnvironmentBackend {
    /// Reports whether [`ENV_FILTER_VAR`] is set.
    #[must_use]
    pub fn available() -> bool {
        env::var_os(ENV_FILTER_VAR).is_some()
    }

    fn apply_environment() -> Result<(), LoggingError> {
        let directive = env::var(ENV_FILTER_VAR).map_err(|error| LoggingError::Filter {
            directive: ENV_FILTER_VAR.to_owned(),
            message: error.to_string(),
        })?;
        apply_filter(&directive)
    }
}

impl LoggingBackend for EnvironmentBackend {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn default_initialisation(&self) -> bool {
        bridge_log();
        match Self::apply_environment() {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(target: LOGGING_TARGET, %error, "environment logging failed");
                false
            }
        }
    }

    fn initialise_from(&self, source: &str) -> bool {
        bridge_log();
        let outcome = source_path(source)
            .and_then(|path| LoggingFileConfig::read(&path))
            .and_then(|config| config.apply());
        match outcome {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(target: LOGGING_TARGET, source, %error, "logging source rejected");
                false
            }
        }
    }

    fn request_shutdown(&self) {}
}
