//! Adapter registries and the named registry implementations.
//!
//! An [`AdapterRegistry`] builds live adapters from configuration documents
//! and writes their current definitions back out. The registry itself is a
//! [`ManagedObject`]: the configuration manager publishes it in the shared
//! [`ObjectRegistry`] alongside the adapters it creates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use interlace_config::BootstrapProperties;
use interlace_management::{Attributes, ManagedObject, ObjectRegistry};
use serde_json::json;

use crate::{Adapter, AdapterError, ConfigLocation, ConfigStore, DefaultMarshaller};

/// Shared handle to a live adapter.
pub type AdapterProxy = Arc<Adapter>;

/// Builds, persists and tracks live adapters.
pub trait AdapterRegistry: ManagedObject {
    /// Builds an adapter from the document at `location` and publishes it.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the document cannot be read or
    /// parsed, or when an adapter with the same id is already published.
    fn create_adapter(&self, location: &ConfigLocation) -> Result<AdapterProxy, AdapterError>;

    /// Writes the adapter's current definition to `location`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when marshalling or writing fails.
    fn persist_adapter(&self, adapter: &Adapter, location: &ConfigLocation)
    -> Result<(), AdapterError>;

    /// Ids of the adapters currently published, in sorted order.
    fn adapter_ids(&self) -> Vec<String>;

    /// Unpublishes an adapter.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the adapter is not published.
    fn destroy_adapter(&self, adapter: &Adapter) -> Result<(), AdapterError>;
}

/// Collaborators handed to registry constructors.
#[derive(Clone)]
pub struct RegistryContext {
    /// Bootstrap properties given to `configure`.
    pub properties: BootstrapProperties,
    /// Registry adapters are published in.
    pub objects: Arc<ObjectRegistry>,
    /// Store used to read and write documents.
    pub store: Arc<dyn ConfigStore>,
    /// Marshaller slot installed by the configuration manager.
    pub marshaller: DefaultMarshaller,
}

impl fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("properties", &self.properties.len())
            .field("objects", &self.objects.len())
            .field("marshaller", &self.marshaller.current())
            .finish_non_exhaustive()
    }
}

/// Constructor for a named registry implementation.
pub type RegistryConstructor =
    Arc<dyn Fn(&RegistryContext) -> Result<Arc<dyn AdapterRegistry>, AdapterError> + Send + Sync>;

/// Name → constructor map consulted for `adapter.registry.impl`.
#[derive(Clone, Default)]
pub struct RegistryFactories {
    constructors: BTreeMap<String, RegistryConstructor>,
}

impl fmt::Debug for RegistryFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

impl RegistryFactories {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&RegistryContext) -> Result<Arc<dyn AdapterRegistry>, AdapterError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    /// Registered implementation names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Builds the implementation registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::RegistryConstruction`] when the name is
    /// unknown or its constructor fails.
    pub fn build(
        &self,
        name: &str,
        context: &RegistryContext,
    ) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        let constructor =
            self.constructors
                .get(name)
                .ok_or_else(|| AdapterError::RegistryConstruction {
                    name: name.to_owned(),
                    message: "no implementation registered under this name".to_owned(),
                })?;
        constructor(context).map_err(|error| AdapterError::RegistryConstruction {
            name: name.to_owned(),
            message: error.to_string(),
        })
    }
}

/// Registry backed by a [`ConfigStore`] and the shared marshaller.
pub struct DefaultAdapterRegistry {
    objects: Arc<ObjectRegistry>,
    store: Arc<dyn ConfigStore>,
    marshaller: DefaultMarshaller,
    adapters: Mutex<BTreeMap<String, AdapterProxy>>,
}

impl fmt::Debug for DefaultAdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAdapterRegistry")
            .field("adapters", &self.adapter_ids())
            .finish_non_exhaustive()
    }
}

impl DefaultAdapterRegistry {
    /// Builds a registry from its collaborators.
    #[must_use]
    pub fn new(context: &RegistryContext) -> Self {
        Self {
            objects: Arc::clone(&context.objects),
            store: Arc::clone(&context.store),
            marshaller: context.marshaller.clone(),
            adapters: Mutex::new(BTreeMap::new()),
        }
    }

    fn adapters(&self) -> MutexGuard<'_, BTreeMap<String, AdapterProxy>> {
        self.adapters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ManagedObject for DefaultAdapterRegistry {
    fn kind(&self) -> &str {
        "AdapterRegistry"
    }

    fn attributes(&self) -> Attributes {
        let marshaller = self.marshaller.current();
        Attributes::from([
            ("adapters".to_owned(), json!(self.adapter_ids())),
            (
                "marshaller".to_owned(),
                json!(marshaller.format().to_string()),
            ),
        ])
    }
}

impl AdapterRegistry for DefaultAdapterRegistry {
    fn create_adapter(&self, location: &ConfigLocation) -> Result<AdapterProxy, AdapterError> {
        let text = self.store.read(location)?;
        let definition = self.marshaller.current().unmarshal(&text)?;
        let adapter = Arc::new(Adapter::new(definition, location.clone())?);

        let mut adapters = self.adapters();
        self.objects.register(
            adapter.object_name().clone(),
            Arc::clone(&adapter) as Arc<dyn ManagedObject>,
        )?;
        adapters.insert(adapter.unique_id().to_owned(), Arc::clone(&adapter));
        tracing::info!(
            target: crate::ADAPTER_TARGET,
            id = adapter.unique_id(),
            location = %location,
            "adapter created"
        );
        Ok(adapter)
    }

    fn persist_adapter(
        &self,
        adapter: &Adapter,
        location: &ConfigLocation,
    ) -> Result<(), AdapterError> {
        let text = self.marshaller.current().marshal(&adapter.definition())?;
        self.store.write(location, &text)?;
        tracing::info!(
            target: crate::ADAPTER_TARGET,
            id = adapter.unique_id(),
            location = %location,
            "adapter configuration persisted"
        );
        Ok(())
    }

    fn adapter_ids(&self) -> Vec<String> {
        self.adapters().keys().cloned().collect()
    }

    fn destroy_adapter(&self, adapter: &Adapter) -> Result<(), AdapterError> {
        let mut adapters = self.adapters();
        self.objects.unregister(adapter.object_name())?;
        adapters.remove(adapter.unique_id());
        tracing::info!(
            target: crate::ADAPTER_TARGET,
            id = adapter.unique_id(),
            "adapter destroyed"
        );
        Ok(())
    }
}
