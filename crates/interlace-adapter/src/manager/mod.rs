//! Configuration managers.
//!
//! A [`ConfigurationManager`] turns bootstrap properties into a live adapter.
//! It owns a lazily built [`AdapterRegistry`] that is published in the
//! object registry the first time anybody asks for it, and it replicates the
//! live adapter definition from the primary configuration location to every
//! declared secondary.
//!
//! Locations come from `adapter.config.url` (the primary) followed by
//! `adapter.config.url.0`, `adapter.config.url.1`, … (the secondaries).

mod vcs;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use interlace_config::BootstrapProperties;
use interlace_config::keys::{
    ADAPTER_CONFIG_DEFAULT_NAME, ADAPTER_CONFIG_URL, ADAPTER_REGISTRY_IMPL,
    ADAPTER_REGISTRY_OBJECT_NAME, CONFIGURATION_MANAGER,
};
use interlace_management::{ManagedObject, ObjectName, ObjectRegistry};
use interlace_vcs::VersionControlLoader;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    Adapter, AdapterError, AdapterProxy, AdapterRegistry, ConfigLocation, ConfigStore,
    DefaultAdapterRegistry, DefaultMarshaller, FileConfigStore, Marshaller, RegistryContext,
    RegistryFactories,
};

pub use vcs::VersionControlledManager;

/// Directory searched for the default configuration resource.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Object name the adapter registry is published under unless overridden.
pub const DEFAULT_REGISTRY_OBJECT_NAME: &str = "interlace:type=AdapterRegistry,id=default";

/// Builds adapters from configuration and keeps replicas in step.
pub trait ConfigurationManager: Send + Sync {
    /// Stores the bootstrap properties and installs the marshaller they
    /// describe.
    ///
    /// Only the first call stores properties; later calls keep them and
    /// reinstall the marshaller.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when a configuration side effect, such as
    /// a version-control checkout, fails.
    fn configure(&self, properties: BootstrapProperties) -> Result<(), AdapterError>;

    /// Returns the adapter registry, building and publishing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::NotConfigured`] before [`Self::configure`],
    /// [`AdapterError::RegistryConstruction`] when a named implementation
    /// cannot be built, or a registration error from the object registry.
    fn adapter_registry(&self) -> Result<Arc<dyn AdapterRegistry>, AdapterError>;

    /// Builds the adapter from the configured or default location.
    ///
    /// # Errors
    ///
    /// See [`Self::create_adapter_from`].
    fn create_adapter(&self) -> Result<AdapterProxy, AdapterError> {
        self.create_adapter_from(None)
    }

    /// Builds the adapter from `location`, or from the configured or default
    /// location when `None`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the manager is unconfigured, the
    /// registry cannot be obtained, or the document cannot be loaded.
    fn create_adapter_from(
        &self,
        location: Option<ConfigLocation>,
    ) -> Result<AdapterProxy, AdapterError>;

    /// Writes the adapter's live definition to every secondary location.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Replication`] for the first secondary that
    /// could not be written. Later secondaries are not attempted.
    fn sync_adapter_configuration(&self, adapter: &Adapter) -> Result<(), AdapterError>;
}

/// Manager variant selected by `configuration.manager`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ConfigurationManagerKind {
    /// Reads the primary and replicates to secondaries.
    #[default]
    ReadWrite,
    /// Reads the primary and never writes.
    ReadOnly,
    /// Keeps configuration in a version-controlled working copy.
    Vcs,
}

impl ConfigurationManagerKind {
    /// Reads the variant from `configuration.manager`, defaulting to
    /// read-write with a warning when the value is not recognised.
    #[must_use]
    pub fn from_properties(properties: &BootstrapProperties) -> Self {
        properties
            .get_non_blank(CONFIGURATION_MANAGER)
            .map_or(Ok(Self::default()), str::parse::<Self>)
            .unwrap_or_else(|_| {
                tracing::warn!(
                    target: crate::ADAPTER_TARGET,
                    key = CONFIGURATION_MANAGER,
                    value = properties.get(CONFIGURATION_MANAGER),
                    "unknown configuration manager; using read-write"
                );
                Self::default()
            })
    }

    /// Builds an unconfigured manager of this variant.
    #[must_use]
    pub fn create(self, context: ManagerContext) -> Arc<dyn ConfigurationManager> {
        match self {
            Self::ReadWrite => Arc::new(ReadWriteManager::new(context)),
            Self::ReadOnly => Arc::new(ReadOnlyManager::new(context)),
            Self::Vcs => Arc::new(VersionControlledManager::new(context)),
        }
    }
}

/// Collaborators shared by every manager variant.
#[derive(Clone)]
pub struct ManagerContext {
    /// Registry the adapter registry and adapters are published in.
    pub objects: Arc<ObjectRegistry>,
    /// Document store.
    pub store: Arc<dyn ConfigStore>,
    /// Named registry implementations.
    pub factories: RegistryFactories,
    /// Version-control backends available to the VCS variant.
    pub version_control: VersionControlLoader,
    /// Marshaller slot shared with the adapter registry.
    pub marshaller: DefaultMarshaller,
    /// Directory holding the default configuration resource.
    pub config_dir: PathBuf,
}

impl std::fmt::Debug for ManagerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerContext")
            .field("factories", &self.factories)
            .field("version_control", &self.version_control)
            .field("config_dir", &self.config_dir)
            .finish_non_exhaustive()
    }
}

impl ManagerContext {
    /// Builds a context with the file store, the standard version-control
    /// backends and no named registries.
    #[must_use]
    pub fn new(objects: Arc<ObjectRegistry>) -> Self {
        Self {
            objects,
            store: Arc::new(FileConfigStore::new()),
            factories: RegistryFactories::new(),
            version_control: VersionControlLoader::standard(),
            marshaller: DefaultMarshaller::new(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
        }
    }

    /// Replaces the document store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the named registry implementations.
    #[must_use]
    pub fn with_factories(mut self, factories: RegistryFactories) -> Self {
        self.factories = factories;
        self
    }

    /// Replaces the version-control loader.
    #[must_use]
    pub fn with_version_control(mut self, loader: VersionControlLoader) -> Self {
        self.version_control = loader;
        self
    }

    /// Replaces the default configuration directory.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }
}

/// State shared by the manager variants.
struct ManagerCore {
    context: ManagerContext,
    properties: OnceCell<BootstrapProperties>,
    registry: OnceCell<Arc<dyn AdapterRegistry>>,
}

impl ManagerCore {
    fn new(context: ManagerContext) -> Self {
        Self {
            context,
            properties: OnceCell::new(),
            registry: OnceCell::new(),
        }
    }

    /// Stores `properties` on the first call and installs the marshaller.
    /// Returns the stored properties and whether this call stored them.
    fn configure(
        &self,
        properties: BootstrapProperties,
    ) -> Result<(&BootstrapProperties, bool), AdapterError> {
        let first = self.properties.set(properties).is_ok();
        if !first {
            tracing::warn!(
                target: crate::ADAPTER_TARGET,
                "configuration manager already configured; keeping original properties"
            );
        }
        let stored = self.properties()?;
        let marshaller = Marshaller::from_properties(stored);
        self.context.marshaller.install(marshaller);
        tracing::debug!(
            target: crate::ADAPTER_TARGET,
            format = %marshaller.format(),
            beautify = marshaller.beautify(),
            "marshaller installed"
        );
        Ok((stored, first))
    }

    fn properties(&self) -> Result<&BootstrapProperties, AdapterError> {
        self.properties.get().ok_or(AdapterError::NotConfigured)
    }

    fn adapter_registry(&self) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        let properties = self.properties()?;
        self.registry
            .get_or_try_init(|| self.build_registry(properties))
            .map(Arc::clone)
    }

    fn build_registry(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        let context = RegistryContext {
            properties: properties.clone(),
            objects: Arc::clone(&self.context.objects),
            store: Arc::clone(&self.context.store),
            marshaller: self.context.marshaller.clone(),
        };
        let registry = properties.get_non_blank(ADAPTER_REGISTRY_IMPL).map_or_else(
            || Ok(Arc::new(DefaultAdapterRegistry::new(&context)) as Arc<dyn AdapterRegistry>),
            |name| self.context.factories.build(name, &context),
        )?;

        let name = ObjectName::parse(
            properties
                .get_non_blank(ADAPTER_REGISTRY_OBJECT_NAME)
                .unwrap_or(DEFAULT_REGISTRY_OBJECT_NAME),
        )?;
        self.context
            .objects
            .register(name.clone(), Arc::clone(&registry) as Arc<dyn ManagedObject>)?;
        tracing::info!(
            target: crate::ADAPTER_TARGET,
            name = %name,
            kind = registry.kind(),
            "adapter registry published"
        );
        Ok(registry)
    }

    fn default_resource_name(&self, properties: &BootstrapProperties) -> String {
        properties
            .get_non_blank(ADAPTER_CONFIG_DEFAULT_NAME)
            .map_or_else(
                || {
                    format!(
                        "adapter.{}",
                        self.context.marshaller.current().format().extension()
                    )
                },
                str::to_owned,
            )
    }

    /// The primary location when declared, otherwise the default resource
    /// under `dir`. Secondaries are not parsed here.
    fn resolve_location(&self, dir: &Path) -> Result<ConfigLocation, AdapterError> {
        let properties = self.properties()?;
        if let Some(primary) = primary_location(properties)? {
            return Ok(primary);
        }
        Ok(ConfigLocation::Path(
            dir.join(self.default_resource_name(properties)),
        ))
    }

    fn create_adapter_at(&self, location: &ConfigLocation) -> Result<AdapterProxy, AdapterError> {
        self.adapter_registry()?.create_adapter(location)
    }

    /// Writes `adapter` to each secondary in declaration order. A secondary
    /// is parsed only when replication reaches it, so earlier secondaries
    /// are written before a malformed later one stops the run.
    fn replicate(&self, adapter: &Adapter) -> Result<(), AdapterError> {
        let properties = self.properties()?;
        let declared = properties.indexed(ADAPTER_CONFIG_URL);
        let Some((declared_primary, secondaries)) = declared.split_first() else {
            tracing::trace!(
                target: crate::ADAPTER_TARGET,
                "no primary configuration location; nothing to replicate"
            );
            return Ok(());
        };
        let primary = declared_primary.parse::<ConfigLocation>()?;

        let registry = self.adapter_registry()?;
        for (index, raw) in secondaries.iter().enumerate() {
            let replication_error = |source| AdapterError::Replication {
                index,
                location: raw.clone(),
                source: Box::new(source),
            };
            let secondary = raw.parse::<ConfigLocation>().map_err(replication_error)?;
            if secondary == primary {
                tracing::debug!(
                    target: crate::ADAPTER_TARGET,
                    location = %secondary,
                    "secondary matches primary; skipped"
                );
                continue;
            }
            registry
                .persist_adapter(adapter, &secondary)
                .map_err(replication_error)?;
            tracing::debug!(
                target: crate::ADAPTER_TARGET,
                index,
                location = %secondary,
                "secondary written"
            );
        }
        tracing::info!(
            target: crate::ADAPTER_TARGET,
            id = adapter.unique_id(),
            primary = %primary,
            "adapter configuration replicated"
        );
        Ok(())
    }
}

fn primary_location(
    properties: &BootstrapProperties,
) -> Result<Option<ConfigLocation>, AdapterError> {
    properties
        .indexed(ADAPTER_CONFIG_URL)
        .first()
        .map(|raw| raw.parse::<ConfigLocation>())
        .transpose()
}

/// Manager that reads the primary location and replicates to secondaries.
pub struct ReadWriteManager {
    core: ManagerCore,
}

impl ReadWriteManager {
    /// Builds an unconfigured manager.
    #[must_use]
    pub fn new(context: ManagerContext) -> Self {
        Self {
            core: ManagerCore::new(context),
        }
    }
}

impl ConfigurationManager for ReadWriteManager {
    fn configure(&self, properties: BootstrapProperties) -> Result<(), AdapterError> {
        self.core.configure(properties).map(drop)
    }

    fn adapter_registry(&self) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        self.core.adapter_registry()
    }

    fn create_adapter_from(
        &self,
        location: Option<ConfigLocation>,
    ) -> Result<AdapterProxy, AdapterError> {
        let resolved = location.map_or_else(
            || self.core.resolve_location(&self.core.context.config_dir),
            Ok,
        )?;
        self.core.create_adapter_at(&resolved)
    }

    fn sync_adapter_configuration(&self, adapter: &Adapter) -> Result<(), AdapterError> {
        self.core.replicate(adapter)
    }
}

/// Manager that reads configuration but never writes it.
pub struct ReadOnlyManager {
    core: ManagerCore,
}

impl ReadOnlyManager {
    /// Builds an unconfigured manager.
    #[must_use]
    pub fn new(context: ManagerContext) -> Self {
        Self {
            core: ManagerCore::new(context),
        }
    }
}

impl ConfigurationManager for ReadOnlyManager {
    fn configure(&self, properties: BootstrapProperties) -> Result<(), AdapterError> {
        self.core.configure(properties).map(drop)
    }

    fn adapter_registry(&self) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        self.core.adapter_registry()
    }

    fn create_adapter_from(
        &self,
        location: Option<ConfigLocation>,
    ) -> Result<AdapterProxy, AdapterError> {
        let resolved = location.map_or_else(
            || self.core.resolve_location(&self.core.context.config_dir),
            Ok,
        )?;
        self.core.create_adapter_at(&resolved)
    }

    fn sync_adapter_configuration(&self, adapter: &Adapter) -> Result<(), AdapterError> {
        tracing::warn!(
            target: crate::ADAPTER_TARGET,
            id = adapter.unique_id(),
            "read-only configuration manager; replication skipped"
        );
        Ok(())
    }
}
