//! Structured names identifying objects in the [`crate::ObjectRegistry`].

use std::fmt;
use std::str::FromStr;

use crate::ManagementError;

const RESERVED: &[char] = &[':', ',', '=', '*', '?', '"'];

/// A `domain:key=value[,key=value…]` object name.
///
/// Key order is preserved as written and participates in equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectName {
    domain: String,
    properties: Vec<(String, String)>,
}

impl ObjectName {
    /// Parses and validates an object name.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::MalformedObjectName`] when the domain is
    /// empty, a property is not `key=value`, or a key repeats.
    pub fn parse(name: &str) -> Result<Self, ManagementError> {
        let malformed = |reason: &str| ManagementError::MalformedObjectName {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };
        let (domain, list) = name
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' after domain"))?;
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(malformed("domain is empty"));
        }
        if domain.contains(RESERVED) {
            return Err(malformed("domain contains a reserved character"));
        }

        let mut properties: Vec<(String, String)> = Vec::new();
        for pair in list.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| malformed("property is not key=value"))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(malformed("property key and value must be non-empty"));
            }
            if key.contains(RESERVED) || value.contains(RESERVED) {
                return Err(malformed("property contains a reserved character"));
            }
            if properties.iter().any(|(existing, _)| existing == key) {
                return Err(malformed("duplicate property key"));
            }
            properties.push((key.to_owned(), value.to_owned()));
        }
        Ok(Self {
            domain: domain.to_owned(),
            properties,
        })
    }

    /// Domain part of the name.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Value of the property `key`, if present.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromStr for ObjectName {
    type Err = ManagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (index, (key, value)) in self.properties.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
