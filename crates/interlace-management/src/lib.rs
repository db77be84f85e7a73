//! Management plane for the Interlace bootstrap layer.
//!
//! Components selected by `management.components` share one
//! [`ObjectRegistry`]. Each is a [`WrappedComponent`] around a
//! [`DelegateFactory`], giving every component the same
//! `init → start ⇄ stop → destroy` lifecycle. Two components are built in:
//! the remote registry connector (`jmx`) and the web console (`webconsole`).

mod connector;
mod error;
mod factory;
mod lifecycle;
mod listener;
mod object_name;
mod registry;
mod webconsole;

pub use connector::{
    AUTH_TOKEN_KEY, CONNECTOR_COMPONENT, ConnectorServer, DEFAULT_CONNECTOR_OBJECT_NAME,
    RemoteRegistryDelegateFactory,
};
pub use error::ManagementError;
pub use factory::{ComponentFactory, ComponentSet, ExtensionConstructor};
pub use lifecycle::{
    Delegate, DelegateFactory, LifecycleDelegate, ManagementComponent, NoOpDelegate,
    WrappedComponent,
};
pub use listener::{
    CONNECTION_IDLE_TIMEOUT, ConnectionHandler, ListenerHandle, SHUTDOWN_GRACE, ServiceAddress,
};
pub use object_name::ObjectName;
pub use registry::{Attributes, ManagedObject, ObjectRegistry};
pub use webconsole::{
    WEBCONSOLE_COMPONENT, WEBCONSOLE_OBJECT_NAME, WebConsole, WebConsoleDelegateFactory,
};

pub(crate) const MANAGEMENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::component");
