//! Serialisation of adapter definitions.
//!
//! The [`Marshaller`] is configured once from `marshaller.output.*` properties
//! and installed into a [`DefaultMarshaller`] slot shared by the
//! configuration manager and the adapter registry it creates.

use std::sync::{Arc, PoisonError, RwLock};

use interlace_config::BootstrapProperties;
use interlace_config::keys::{MARSHALLER_OUTPUT_BEAUTIFY, MARSHALLER_OUTPUT_FORMAT};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{AdapterDefinition, AdapterError};

/// Document formats understood by the marshaller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MarshalFormat {
    /// JSON documents.
    #[default]
    Json,
    /// YAML documents.
    Yaml,
}

impl MarshalFormat {
    /// File extension for documents in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Converts adapter definitions to and from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marshaller {
    format: MarshalFormat,
    beautify: bool,
}

impl Marshaller {
    /// Builds a marshaller.
    #[must_use]
    pub const fn new(format: MarshalFormat, beautify: bool) -> Self {
        Self { format, beautify }
    }

    /// Builds a marshaller from `marshaller.output.*` properties.
    ///
    /// An unrecognised format falls back to JSON with a warning.
    #[must_use]
    pub fn from_properties(properties: &BootstrapProperties) -> Self {
        let format = properties
            .get_non_blank(MARSHALLER_OUTPUT_FORMAT)
            .map_or(Ok(MarshalFormat::default()), str::parse::<MarshalFormat>)
            .unwrap_or_else(|_| {
                tracing::warn!(
                    target: crate::ADAPTER_TARGET,
                    key = MARSHALLER_OUTPUT_FORMAT,
                    value = properties.get(MARSHALLER_OUTPUT_FORMAT),
                    "unknown marshaller format; using json"
                );
                MarshalFormat::default()
            });
        Self::new(format, properties.get_bool(MARSHALLER_OUTPUT_BEAUTIFY, false))
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> MarshalFormat {
        self.format
    }

    /// Whether output is pretty-printed.
    #[must_use]
    pub const fn beautify(&self) -> bool {
        self.beautify
    }

    /// Serialises a definition.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Marshal`] when serialisation fails.
    pub fn marshal(&self, definition: &AdapterDefinition) -> Result<String, AdapterError> {
        let failure = |message: String| AdapterError::Marshal {
            operation: "marshal",
            format: self.format.to_string(),
            message,
        };
        match (self.format, self.beautify) {
            (MarshalFormat::Json, true) => serde_json::to_string_pretty(definition)
                .map_err(|error| failure(error.to_string())),
            (MarshalFormat::Json, false) => {
                serde_json::to_string(definition).map_err(|error| failure(error.to_string()))
            }
            (MarshalFormat::Yaml, _) => {
                serde_yaml::to_string(definition).map_err(|error| failure(error.to_string()))
            }
        }
    }

    /// Parses a definition.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Marshal`] when the text is not a valid
    /// definition in this marshaller's format.
    pub fn unmarshal(&self, text: &str) -> Result<AdapterDefinition, AdapterError> {
        let failure = |message: String| AdapterError::Marshal {
            operation: "unmarshal",
            format: self.format.to_string(),
            message,
        };
        match self.format {
            MarshalFormat::Json => {
                serde_json::from_str(text).map_err(|error| failure(error.to_string()))
            }
            MarshalFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|error| failure(error.to_string()))
            }
        }
    }
}

/// Shared slot holding the process marshaller.
#[derive(Debug, Clone, Default)]
pub struct DefaultMarshaller {
    slot: Arc<RwLock<Marshaller>>,
}

impl DefaultMarshaller {
    /// Creates a slot holding the default JSON marshaller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the installed marshaller.
    pub fn install(&self, marshaller: Marshaller) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = marshaller;
    }

    /// Currently installed marshaller.
    #[must_use]
    pub fn current(&self) -> Marshaller {
        *self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
