//! Builds management components from the `management.components` selector.
//!
//! The selector is a `:` or `,` delimited list. `jmx` and `webconsole` name
//! the built-in components; every other token must have been registered as
//! an extension before [`ComponentFactory::create`] is called.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use interlace_config::BootstrapProperties;
use interlace_config::keys::MANAGEMENT_COMPONENTS;

use crate::connector::{CONNECTOR_COMPONENT, RemoteRegistryDelegateFactory};
use crate::webconsole::{WEBCONSOLE_COMPONENT, WebConsoleDelegateFactory};
use crate::{ManagementComponent, ManagementError, ObjectRegistry, WrappedComponent};

/// Builds an extension component bound to the shared object registry.
pub type ExtensionConstructor =
    Box<dyn Fn(Arc<ObjectRegistry>) -> Box<dyn ManagementComponent> + Send + Sync>;

/// Creates management components by selector token.
pub struct ComponentFactory {
    registry: Arc<ObjectRegistry>,
    extensions: BTreeMap<String, ExtensionConstructor>,
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ComponentFactory {
    /// Builds a factory whose components publish into `registry`.
    #[must_use]
    pub fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self {
            registry,
            extensions: BTreeMap::new(),
        }
    }

    /// Registers a component constructor under `name`.
    ///
    /// Registering the same name again replaces the earlier constructor.
    pub fn register_extension<C>(&mut self, name: impl Into<String>, constructor: C)
    where
        C: Fn(Arc<ObjectRegistry>) -> Box<dyn ManagementComponent> + Send + Sync + 'static,
    {
        self.extensions.insert(name.into(), Box::new(constructor));
    }

    /// Splits a selector list into trimmed, non-empty tokens.
    #[must_use]
    pub fn selectors(raw: &str) -> Vec<&str> {
        raw.split([':', ','])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Creates the components named by `management.components`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::UnknownComponent`] for a token that is
    /// neither built in nor registered.
    pub fn create(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<Vec<Box<dyn ManagementComponent>>, ManagementError> {
        let raw = properties.get_or(MANAGEMENT_COMPONENTS, "");
        Self::selectors(raw)
            .into_iter()
            .map(|token| self.create_named(token))
            .collect()
    }

    /// Creates a single component by selector token.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::UnknownComponent`] for an unknown token.
    pub fn create_named(&self, token: &str) -> Result<Box<dyn ManagementComponent>, ManagementError> {
        let registry = Arc::clone(&self.registry);
        match token {
            CONNECTOR_COMPONENT => Ok(Box::new(WrappedComponent::new(
                RemoteRegistryDelegateFactory::new(registry),
            ))),
            WEBCONSOLE_COMPONENT => Ok(Box::new(WrappedComponent::new(
                WebConsoleDelegateFactory::new(registry),
            ))),
            other => self
                .extensions
                .get(other)
                .map(|constructor| constructor(registry))
                .ok_or_else(|| ManagementError::UnknownComponent {
                    name: other.to_owned(),
                }),
        }
    }
}

/// Ordered set of management components driven together.
#[derive(Default)]
pub struct ComponentSet {
    components: Vec<Box<dyn ManagementComponent>>,
}

impl fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.components.iter().map(|component| component.name()))
            .finish()
    }
}

impl From<Vec<Box<dyn ManagementComponent>>> for ComponentSet {
    fn from(components: Vec<Box<dyn ManagementComponent>>) -> Self {
        Self { components }
    }
}

impl ComponentSet {
    /// Component names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|component| component.name())
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` when the set holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Initialises every component, stopping at the first failure.
    ///
    /// Components initialised before the failing one are destroyed again,
    /// so a failed call leaves nothing registered.
    ///
    /// # Errors
    ///
    /// Returns the first component failure.
    pub fn init_all(&mut self, properties: &BootstrapProperties) -> Result<(), ManagementError> {
        let failure = self
            .components
            .iter_mut()
            .enumerate()
            .find_map(|(index, component)| {
                let error = component.init(properties).err()?;
                tracing::warn!(
                    target: crate::MANAGEMENT_TARGET,
                    component = component.name(),
                    %error,
                    "management component failed to initialise; rolling back"
                );
                Some((index, error))
            });
        let Some((index, error)) = failure else {
            return Ok(());
        };
        if let Some(initialised) = self.components.get_mut(..index) {
            // Cleanup failures are logged; the init error is returned.
            let _rollback = visit_all(initialised, "destroy", |earlier| earlier.destroy());
        }
        Err(error)
    }

    /// Starts every component, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first component failure.
    pub fn start_all(&mut self) -> Result<(), ManagementError> {
        self.components
            .iter_mut()
            .try_for_each(|component| component.start())
    }

    /// Stops every component, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns the first failure once every component has been visited.
    pub fn stop_all(&mut self) -> Result<(), ManagementError> {
        visit_all(&mut self.components, "stop", |component| component.stop())
    }

    /// Destroys every component, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns the first failure once every component has been visited.
    pub fn destroy_all(&mut self) -> Result<(), ManagementError> {
        visit_all(&mut self.components, "destroy", |component| component.destroy())
    }
}

fn visit_all(
    components: &mut [Box<dyn ManagementComponent>],
    operation: &str,
    mut action: impl FnMut(&mut Box<dyn ManagementComponent>) -> Result<(), ManagementError>,
) -> Result<(), ManagementError> {
    let mut first_error = None;
    for component in components.iter_mut() {
        if let Err(error) = action(component) {
            tracing::warn!(
                target: crate::MANAGEMENT_TARGET,
                component = component.name(),
                operation,
                %error,
                "management component operation failed"
            );
            first_error.get_or_insert(error);
        }
    }
    first_error.map_or(Ok(()), Err)
}
