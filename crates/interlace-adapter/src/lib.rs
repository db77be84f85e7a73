//! Adapter configuration for the Interlace bootstrap layer.
//!
//! A [`ConfigurationManager`] reads the adapter definition from its primary
//! [`ConfigLocation`], builds a live [`Adapter`] through an
//! [`AdapterRegistry`] and replicates the live definition to any secondary
//! locations. Documents are read and written through a [`ConfigStore`] and
//! serialised by the [`Marshaller`] installed in the shared
//! [`DefaultMarshaller`] slot.

mod definition;
mod error;
mod location;
mod manager;
mod marshaller;
mod registry;
mod store;

pub use definition::{Adapter, AdapterDefinition};
pub use error::AdapterError;
pub use location::ConfigLocation;
pub use manager::{
    ConfigurationManager, ConfigurationManagerKind, DEFAULT_CONFIG_DIR,
    DEFAULT_REGISTRY_OBJECT_NAME, ManagerContext, ReadOnlyManager, ReadWriteManager,
    VersionControlledManager,
};
pub use marshaller::{DefaultMarshaller, MarshalFormat, Marshaller};
pub use registry::{
    AdapterProxy, AdapterRegistry, DefaultAdapterRegistry, RegistryConstructor, RegistryContext,
    RegistryFactories,
};
pub use store::{ConfigStore, FileConfigStore};

pub(crate) const ADAPTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::configuration");
