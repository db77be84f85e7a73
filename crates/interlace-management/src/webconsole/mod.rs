//! Embedded web console (`webconsole` component).
//!
//! Serves a read-only JSON listing of the object registry at `GET /objects`.
//! Other paths answer 404 and other methods 405, both with a JSON error body.

mod server;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use interlace_config::BootstrapProperties;
use interlace_config::keys::WEBCONSOLE_LISTEN_ADDRESS;
use serde_json::json;

use self::server::ConsoleServer;
use crate::listener::ServiceAddress;
use crate::registry::{Attributes, ManagedObject};
use crate::{
    DelegateFactory, LifecycleDelegate, MANAGEMENT_TARGET, ManagementError, ObjectName,
    ObjectRegistry,
};

/// Selector token for the web console component.
pub const WEBCONSOLE_COMPONENT: &str = "webconsole";

/// Object name the web console registers under.
pub const WEBCONSOLE_OBJECT_NAME: &str = "interlace:type=WebConsole,name=default";

/// Builds web console delegates from bootstrap properties.
#[derive(Debug, Clone)]
pub struct WebConsoleDelegateFactory {
    registry: Arc<ObjectRegistry>,
}

impl WebConsoleDelegateFactory {
    /// Builds a factory publishing `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self { registry }
    }
}

impl DelegateFactory for WebConsoleDelegateFactory {
    fn component_name(&self) -> &str {
        WEBCONSOLE_COMPONENT
    }

    fn create_delegate(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<Option<Box<dyn LifecycleDelegate>>, ManagementError> {
        let Some(raw_address) = properties.get_non_blank(WEBCONSOLE_LISTEN_ADDRESS) else {
            tracing::debug!(
                target: MANAGEMENT_TARGET,
                key = WEBCONSOLE_LISTEN_ADDRESS,
                "no web console address configured; web console disabled"
            );
            return Ok(None);
        };
        let address: ServiceAddress = raw_address.parse()?;
        Ok(Some(Box::new(WebConsoleDelegate {
            registry: Arc::clone(&self.registry),
            name: ObjectName::parse(WEBCONSOLE_OBJECT_NAME)?,
            console: Arc::new(WebConsole {
                address,
                bound: Mutex::new(None),
            }),
            server: None,
        })))
    }
}

/// Managed view of the web console.
#[derive(Debug)]
pub struct WebConsole {
    address: ServiceAddress,
    bound: Mutex<Option<SocketAddr>>,
}

impl WebConsole {
    fn set_bound(&self, bound: Option<SocketAddr>) {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner) = bound;
    }
}

impl ManagedObject for WebConsole {
    fn kind(&self) -> &str {
        "WebConsole"
    }

    fn attributes(&self) -> Attributes {
        let bound = *self.bound.lock().unwrap_or_else(PoisonError::into_inner);
        Attributes::from([
            ("address".to_owned(), json!(self.address.to_string())),
            ("active".to_owned(), json!(bound.is_some())),
            (
                "boundAddress".to_owned(),
                json!(bound.map(|addr| addr.to_string())),
            ),
        ])
    }
}

struct WebConsoleDelegate {
    registry: Arc<ObjectRegistry>,
    name: ObjectName,
    console: Arc<WebConsole>,
    server: Option<ConsoleServer>,
}

impl LifecycleDelegate for WebConsoleDelegate {
    fn register(&mut self) -> Result<(), ManagementError> {
        self.registry.register(
            self.name.clone(),
            Arc::clone(&self.console) as Arc<dyn ManagedObject>,
        )
    }

    fn start(&mut self) -> Result<(), ManagementError> {
        if self.server.is_some() {
            return Ok(());
        }
        let server = ConsoleServer::start(&self.console.address, Arc::clone(&self.registry))?;
        self.console.set_bound(Some(server.local_addr()));
        tracing::info!(
            target: MANAGEMENT_TARGET,
            local_addr = %server.local_addr(),
            "web console started"
        );
        self.server = Some(server);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ManagementError> {
        if let Some(server) = self.server.take() {
            server.stop();
            self.console.set_bound(None);
            tracing::info!(target: MANAGEMENT_TARGET, "web console stopped");
        }
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), ManagementError> {
        self.stop()?;
        self.registry.unregister(&self.name).map(drop)
    }
}

#[cfg(test)]
mod tests;
