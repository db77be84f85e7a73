//! Launcher settings layered by `ortho_config`.
//!
//! Settings cover the process-level concerns that must be known before the
//! bootstrap properties are read: where those properties live and how the
//! launcher logs. Values merge defaults, an optional configuration file,
//! `INTERLACE_*` environment variables and command-line flags, in that order.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{
    DEFAULT_BOOTSTRAP_PROPERTIES, DEFAULT_LOG_FILTER, default_log_filter, default_log_format,
};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON lines.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Command-line flags consumed by the settings loader rather than the
/// selected program.
pub const SETTINGS_CLI_FLAGS: &[&str] = &[
    "--log-filter",
    "--log-format",
    "--bootstrap-properties",
    "--config-path",
];

/// Process-level launcher settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "INTERLACE")]
pub struct LauncherSettings {
    /// Tracing filter directive applied before a logging backend is chosen.
    #[serde(default)]
    #[ortho_config(default = default_log_filter().to_owned())]
    pub log_filter: Option<String>,
    /// Output format for launcher logs.
    #[serde(default)]
    #[ortho_config(default = default_log_format())]
    pub log_format: Option<LogFormat>,
    /// Location of the bootstrap properties file. Left unset by default so
    /// the launcher can tell an explicit path from the built-in one.
    #[serde(default)]
    pub bootstrap_properties: Option<PathBuf>,
}

impl LauncherSettings {
    /// Effective log filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Effective log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_default()
    }

    /// Effective bootstrap properties path.
    #[must_use]
    pub fn bootstrap_properties(&self) -> &Path {
        self.bootstrap_properties
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_BOOTSTRAP_PROPERTIES))
    }
}
