//! Default values applied when neither settings nor properties supply one.

use std::path::PathBuf;

use crate::settings::LogFormat;

/// Default log filter expression used by the launcher.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment prefix shared by settings and property overrides.
pub const ENV_PREFIX: &str = "INTERLACE_";

/// Default location of the bootstrap properties file.
pub const DEFAULT_BOOTSTRAP_PROPERTIES: &str = "./config/bootstrap.properties";

/// Default log filter expression used by the launcher.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the launcher.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default bootstrap properties path.
#[must_use]
pub fn default_bootstrap_properties() -> PathBuf {
    PathBuf::from(DEFAULT_BOOTSTRAP_PROPERTIES)
}
