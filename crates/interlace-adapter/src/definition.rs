//! Adapter definitions and live adapter instances.

use std::sync::{PoisonError, RwLock};

use interlace_management::{Attributes, ManagedObject, ManagementError, ObjectName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::ConfigLocation;

/// Serialized adapter configuration.
///
/// Only `unique-id` is interpreted here; every other field is carried
/// verbatim for the message pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterDefinition {
    /// Identifier unique within one process.
    #[serde(rename = "unique-id")]
    pub unique_id: String,
    /// Remaining configuration, consumed by the pipeline.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl AdapterDefinition {
    /// Builds a definition with an empty body.
    #[must_use]
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            body: Map::new(),
        }
    }

    /// Adds or replaces a body entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }
}

/// A live adapter built from an [`AdapterDefinition`].
#[derive(Debug)]
pub struct Adapter {
    unique_id: String,
    object_name: ObjectName,
    source: ConfigLocation,
    definition: RwLock<AdapterDefinition>,
}

impl Adapter {
    /// Builds a live adapter loaded from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::MalformedObjectName`] when the unique id
    /// cannot form part of an object name.
    pub fn new(definition: AdapterDefinition, source: ConfigLocation) -> Result<Self, ManagementError> {
        let object_name = ObjectName::parse(&format!(
            "interlace:type=Adapter,id={}",
            definition.unique_id
        ))?;
        Ok(Self {
            unique_id: definition.unique_id.clone(),
            object_name,
            source,
            definition: RwLock::new(definition),
        })
    }

    /// Adapter identifier.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Name the adapter is registered under.
    #[must_use]
    pub const fn object_name(&self) -> &ObjectName {
        &self.object_name
    }

    /// Location the adapter was loaded from.
    #[must_use]
    pub const fn source(&self) -> &ConfigLocation {
        &self.source
    }

    /// Snapshot of the current definition.
    #[must_use]
    pub fn definition(&self) -> AdapterDefinition {
        self.definition
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the live definition body. The unique id is fixed for the
    /// lifetime of the adapter.
    pub fn update_body(&self, body: Map<String, Value>) {
        self.definition
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .body = body;
    }
}

impl ManagedObject for Adapter {
    fn kind(&self) -> &str {
        "Adapter"
    }

    fn attributes(&self) -> Attributes {
        let definition = self.definition();
        Attributes::from([
            ("uniqueId".to_owned(), json!(self.unique_id)),
            ("source".to_owned(), json!(self.source.to_string())),
            (
                "sections".to_owned(),
                json!(definition.body.keys().collect::<Vec<_>>()),
            ),
        ])
    }
}
