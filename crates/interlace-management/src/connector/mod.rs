//! Remote registry exposure (`jmx` component).
//!
//! The connector server publishes the object registry over a line-oriented
//! TCP protocol. Its environment comes from `remote.registry.env.*`
//! properties, each value resolved through a [`PropertyResolver`] so that
//! secrets can be supplied as placeholders or obfuscated values.

mod protocol;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use interlace_config::keys::{
    REMOTE_REGISTRY_ENV_PREFIX, REMOTE_REGISTRY_OBJECT_NAME, REMOTE_REGISTRY_SERVICE_ADDRESS,
};
use interlace_config::{BootstrapProperties, PlaceholderResolver, PropertyResolver};
use serde_json::json;

use self::protocol::ConnectorProtocol;
use crate::listener::{ListenerHandle, ServiceAddress};
use crate::registry::{Attributes, ManagedObject};
use crate::{
    DelegateFactory, LifecycleDelegate, MANAGEMENT_TARGET, ManagementError, ObjectName,
    ObjectRegistry,
};

/// Selector token for the connector component.
pub const CONNECTOR_COMPONENT: &str = "jmx";

/// Object name used when `remote.registry.object.name` is unset.
pub const DEFAULT_CONNECTOR_OBJECT_NAME: &str = "interlace:type=ConnectorServer,name=remote";

/// Environment key holding the shared authentication token.
pub const AUTH_TOKEN_KEY: &str = "auth.token";

type ResolverFactory = Arc<dyn Fn(&BootstrapProperties) -> Box<dyn PropertyResolver> + Send + Sync>;

/// Builds connector delegates from bootstrap properties.
#[derive(Clone)]
pub struct RemoteRegistryDelegateFactory {
    registry: Arc<ObjectRegistry>,
    resolver: ResolverFactory,
}

impl std::fmt::Debug for RemoteRegistryDelegateFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRegistryDelegateFactory")
            .finish_non_exhaustive()
    }
}

impl RemoteRegistryDelegateFactory {
    /// Builds a factory resolving values with [`PlaceholderResolver`].
    #[must_use]
    pub fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self {
            registry,
            resolver: Arc::new(
                |properties: &BootstrapProperties| -> Box<dyn PropertyResolver> {
                    Box::new(PlaceholderResolver::new(properties.clone()))
                },
            ),
        }
    }

    /// Replaces the resolver used for environment values.
    #[must_use]
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: Fn(&BootstrapProperties) -> Box<dyn PropertyResolver> + Send + Sync + 'static,
    {
        self.resolver = Arc::new(resolver);
        self
    }

    fn environment(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<BTreeMap<String, String>, ManagementError> {
        let resolver = (self.resolver)(properties);
        properties
            .subset(REMOTE_REGISTRY_ENV_PREFIX)
            .iter()
            .map(|(key, raw)| {
                resolver
                    .resolve(raw)
                    .map(|value| (key.to_owned(), value))
                    .map_err(|source| ManagementError::Environment {
                        key: key.to_owned(),
                        source,
                    })
            })
            .collect()
    }
}

impl DelegateFactory for RemoteRegistryDelegateFactory {
    fn component_name(&self) -> &str {
        CONNECTOR_COMPONENT
    }

    fn create_delegate(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<Option<Box<dyn LifecycleDelegate>>, ManagementError> {
        let Some(raw_address) = properties.get_non_blank(REMOTE_REGISTRY_SERVICE_ADDRESS) else {
            tracing::debug!(
                target: MANAGEMENT_TARGET,
                key = REMOTE_REGISTRY_SERVICE_ADDRESS,
                "no connector address configured; remote registry disabled"
            );
            return Ok(None);
        };
        let address: ServiceAddress = raw_address.parse()?;
        let name = ObjectName::parse(
            properties.get_or(REMOTE_REGISTRY_OBJECT_NAME, DEFAULT_CONNECTOR_OBJECT_NAME),
        )?;
        let environment = self.environment(properties)?;
        Ok(Some(Box::new(ConnectorDelegate {
            registry: Arc::clone(&self.registry),
            name,
            server: Arc::new(ConnectorServer::new(address, &environment)),
            token: environment.get(AUTH_TOKEN_KEY).cloned(),
            listener: None,
        })))
    }
}

/// Managed view of the connector server.
#[derive(Debug)]
pub struct ConnectorServer {
    address: ServiceAddress,
    environment_keys: Vec<String>,
    bound: Mutex<Option<SocketAddr>>,
}

impl ConnectorServer {
    fn new(address: ServiceAddress, environment: &BTreeMap<String, String>) -> Self {
        Self {
            address,
            environment_keys: environment.keys().cloned().collect(),
            bound: Mutex::new(None),
        }
    }

    fn set_bound(&self, bound: Option<SocketAddr>) {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner) = bound;
    }

    fn bound(&self) -> Option<SocketAddr> {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ManagedObject for ConnectorServer {
    fn kind(&self) -> &str {
        "ConnectorServer"
    }

    fn attributes(&self) -> Attributes {
        let bound = self.bound();
        Attributes::from([
            ("address".to_owned(), json!(self.address.to_string())),
            ("active".to_owned(), json!(bound.is_some())),
            (
                "boundAddress".to_owned(),
                json!(bound.map(|addr| addr.to_string())),
            ),
            ("environment".to_owned(), json!(self.environment_keys)),
        ])
    }
}

struct ConnectorDelegate {
    registry: Arc<ObjectRegistry>,
    name: ObjectName,
    server: Arc<ConnectorServer>,
    token: Option<String>,
    listener: Option<ListenerHandle>,
}

impl LifecycleDelegate for ConnectorDelegate {
    fn register(&mut self) -> Result<(), ManagementError> {
        self.registry.register(
            self.name.clone(),
            Arc::clone(&self.server) as Arc<dyn ManagedObject>,
        )
    }

    fn start(&mut self) -> Result<(), ManagementError> {
        if self.listener.is_some() {
            return Ok(());
        }
        let handler = ConnectorProtocol::new(Arc::clone(&self.registry), self.token.clone());
        let listener = ListenerHandle::start(&self.server.address, Arc::new(handler))?;
        self.server.set_bound(Some(listener.local_addr()));
        tracing::info!(
            target: MANAGEMENT_TARGET,
            name = %self.name,
            local_addr = %listener.local_addr(),
            "connector server started"
        );
        self.listener = Some(listener);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ManagementError> {
        if let Some(listener) = self.listener.take() {
            listener.stop();
            self.server.set_bound(None);
            tracing::info!(target: MANAGEMENT_TARGET, name = %self.name, "connector server stopped");
        }
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), ManagementError> {
        self.stop()?;
        self.registry.unregister(&self.name).map(drop)
    }
}
