//! Placeholder and secret resolution for property values.
//!
//! Components that pass configuration to external collaborators (for example
//! the remote connector environment) resolve each value through a
//! [`PropertyResolver`] first. The default [`PlaceholderResolver`] expands
//! `${env:NAME}` and `${prop:KEY}` references and decodes `obf:` secrets.

use std::env;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::BootstrapProperties;

/// Prefix marking an obfuscated secret value.
pub const OBFUSCATED_PREFIX: &str = "obf:";

/// Errors raised while resolving a property value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// An `${env:NAME}` reference named an unset variable.
    #[error("environment variable '{name}' is not set")]
    MissingEnvironment {
        /// Variable name.
        name: String,
    },
    /// A `${prop:KEY}` reference named an absent property.
    #[error("property '{key}' referenced by a placeholder is not defined")]
    MissingProperty {
        /// Referenced key.
        key: String,
    },
    /// A placeholder was opened but never closed or used an unknown scheme.
    #[error("malformed placeholder in '{value}'")]
    MalformedPlaceholder {
        /// Offending raw value.
        value: String,
    },
    /// An `obf:` value was not valid base64 UTF-8.
    #[error("obfuscated value could not be decoded")]
    InvalidSecret,
}

/// Resolves raw property values into their effective form.
pub trait PropertyResolver: Send + Sync {
    /// Resolves a single raw value.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when a reference cannot be satisfied.
    fn resolve(&self, value: &str) -> Result<String, ResolveError>;
}

/// Default resolver backed by the process environment and a property bag.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderResolver {
    properties: BootstrapProperties,
}

impl PlaceholderResolver {
    /// Builds a resolver whose `${prop:..}` lookups consult `properties`.
    #[must_use]
    pub fn new(properties: BootstrapProperties) -> Self {
        Self { properties }
    }

    fn lookup(&self, reference: &str, raw: &str) -> Result<String, ResolveError> {
        match reference.split_once(':') {
            Some(("env", name)) => env::var(name).map_err(|_| ResolveError::MissingEnvironment {
                name: name.to_owned(),
            }),
            Some(("prop", key)) => self
                .properties
                .get(key)
                .map(str::to_owned)
                .ok_or_else(|| ResolveError::MissingProperty {
                    key: key.to_owned(),
                }),
            _ => Err(ResolveError::MalformedPlaceholder {
                value: raw.to_owned(),
            }),
        }
    }
}

impl PropertyResolver for PlaceholderResolver {
    fn resolve(&self, value: &str) -> Result<String, ResolveError> {
        if let Some(encoded) = value.strip_prefix(OBFUSCATED_PREFIX) {
            return decode_secret(encoded);
        }

        let mut resolved = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            let (head, tail) = rest.split_at(start);
            resolved.push_str(head);
            let body = tail.get(2..).unwrap_or_default();
            let Some(end) = body.find('}') else {
                return Err(ResolveError::MalformedPlaceholder {
                    value: value.to_owned(),
                });
            };
            let (reference, after) = body.split_at(end);
            resolved.push_str(&self.lookup(reference, value)?);
            rest = after.get(1..).unwrap_or_default();
        }
        resolved.push_str(rest);
        Ok(resolved)
    }
}

/// Encodes a plain secret into its `obf:` representation.
#[must_use]
pub fn obfuscate(secret: &str) -> String {
    format!("{OBFUSCATED_PREFIX}{}", STANDARD.encode(secret.as_bytes()))
}

fn decode_secret(encoded: &str) -> Result<String, ResolveError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ResolveError::InvalidSecret)?;
    String::from_utf8(bytes).map_err(|_| ResolveError::InvalidSecret)
}
