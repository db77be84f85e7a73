//! Shared configuration primitives for the Interlace bootstrap layer.
//!
//! Every bootstrap component consumes the same [`BootstrapProperties`] bag.
//! The crate also defines the stable key names ([`keys`]), the placeholder and
//! secret [`PropertyResolver`], and the [`LauncherSettings`] loaded through
//! `ortho_config` before the property bag itself is read.

mod defaults;
pub mod keys;
mod properties;
mod resolver;
mod settings;

pub use defaults::{
    DEFAULT_BOOTSTRAP_PROPERTIES, DEFAULT_LOG_FILTER, ENV_PREFIX, default_bootstrap_properties,
    default_log_filter, default_log_format,
};
pub use properties::{BootstrapProperties, PropertiesError};
pub use resolver::{
    OBFUSCATED_PREFIX, PlaceholderResolver, PropertyResolver, ResolveError, obfuscate,
};
pub use settings::{LauncherSettings, LogFormat, LogFormatParseError, SETTINGS_CLI_FLAGS};
