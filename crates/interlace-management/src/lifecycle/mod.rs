//! Uniform lifecycle shared by every management component.
//!
//! A [`WrappedComponent`] owns exactly one [`Delegate`]. `init` asks the
//! component's [`DelegateFactory`] for a configured delegate and registers
//! whichever delegate ends up installed; `destroy` unregisters it. `start` and
//! `stop` are only accepted between those two points.

use interlace_config::BootstrapProperties;

use crate::ManagementError;

/// Lifecycle operations every management component supports.
pub trait ManagementComponent: Send {
    /// Component name used in logs and errors.
    fn name(&self) -> &str;

    /// Configures the component and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when configuration or registration fails,
    /// or when the component was already initialised.
    fn init(&mut self, properties: &BootstrapProperties) -> Result<(), ManagementError>;

    /// Starts the component.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::InvalidState`] outside the registered
    /// window, or the delegate's own failure.
    fn start(&mut self) -> Result<(), ManagementError>;

    /// Stops the component.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::InvalidState`] outside the registered
    /// window, or the delegate's own failure.
    fn stop(&mut self) -> Result<(), ManagementError>;

    /// Unregisters the component. It cannot be used afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::InvalidState`] unless the component is
    /// registered, or the delegate's own failure.
    fn destroy(&mut self) -> Result<(), ManagementError>;
}

/// Behaviour installed behind a [`WrappedComponent`].
pub trait LifecycleDelegate: Send {
    /// Publishes the delegate in the object registry.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when registration fails.
    fn register(&mut self) -> Result<(), ManagementError>;

    /// Begins serving.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the delegate cannot start.
    fn start(&mut self) -> Result<(), ManagementError>;

    /// Stops serving.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the delegate cannot stop cleanly.
    fn stop(&mut self) -> Result<(), ManagementError>;

    /// Removes the delegate from the object registry.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when unregistration fails.
    fn unregister(&mut self) -> Result<(), ManagementError>;
}

/// Delegate that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDelegate;

impl LifecycleDelegate for NoOpDelegate {
    fn register(&mut self) -> Result<(), ManagementError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), ManagementError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ManagementError> {
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), ManagementError> {
        Ok(())
    }
}

/// The delegate slot of a [`WrappedComponent`].
#[derive(Default)]
pub enum Delegate {
    /// No configured delegate; behaves as [`NoOpDelegate`].
    #[default]
    Default,
    /// A delegate produced by the component's factory.
    Configured(Box<dyn LifecycleDelegate>),
}

impl Delegate {
    /// Returns `true` when a configured delegate is installed.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    fn with<T>(&mut self, action: impl FnOnce(&mut dyn LifecycleDelegate) -> T) -> T {
        match self {
            Self::Default => action(&mut NoOpDelegate),
            Self::Configured(delegate) => action(delegate.as_mut()),
        }
    }
}

impl std::fmt::Debug for Delegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Delegate::Default"),
            Self::Configured(_) => f.write_str("Delegate::Configured(..)"),
        }
    }
}

/// Produces the configured delegate for a component kind.
pub trait DelegateFactory: Send {
    /// Name of the component the factory configures.
    fn component_name(&self) -> &str;

    /// Builds a delegate from bootstrap properties.
    ///
    /// `Ok(None)` leaves the default no-op delegate in place.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the properties are invalid.
    fn create_delegate(
        &self,
        properties: &BootstrapProperties,
    ) -> Result<Option<Box<dyn LifecycleDelegate>>, ManagementError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Registered,
    Destroyed,
}

impl State {
    const fn describe(self) -> &'static str {
        match self {
            Self::Created => "uninitialised",
            Self::Registered => "registered",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Management component driving a factory-built delegate.
#[derive(Debug)]
pub struct WrappedComponent<F> {
    factory: F,
    delegate: Delegate,
    state: State,
}

impl<F: DelegateFactory> WrappedComponent<F> {
    /// Wraps `factory` with the default delegate installed.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            delegate: Delegate::Default,
            state: State::Created,
        }
    }

    /// Current delegate slot.
    #[must_use]
    pub const fn delegate(&self) -> &Delegate {
        &self.delegate
    }

    fn require(&self, expected: State, operation: &'static str) -> Result<(), ManagementError> {
        if self.state == expected {
            return Ok(());
        }
        Err(ManagementError::InvalidState {
            component: self.factory.component_name().to_owned(),
            operation,
            state: self.state.describe(),
        })
    }
}

impl<F: DelegateFactory> ManagementComponent for WrappedComponent<F> {
    fn name(&self) -> &str {
        self.factory.component_name()
    }

    fn init(&mut self, properties: &BootstrapProperties) -> Result<(), ManagementError> {
        self.require(State::Created, "init")?;
        if let Some(configured) = self.factory.create_delegate(properties)? {
            self.delegate = Delegate::Configured(configured);
        }
        self.delegate.with(|delegate| delegate.register())?;
        self.state = State::Registered;
        tracing::debug!(
            target: crate::MANAGEMENT_TARGET,
            component = self.name(),
            configured = self.delegate.is_configured(),
            "management component initialised"
        );
        Ok(())
    }

    fn start(&mut self) -> Result<(), ManagementError> {
        self.require(State::Registered, "start")?;
        self.delegate.with(|delegate| delegate.start())
    }

    fn stop(&mut self) -> Result<(), ManagementError> {
        self.require(State::Registered, "stop")?;
        self.delegate.with(|delegate| delegate.stop())
    }

    fn destroy(&mut self) -> Result<(), ManagementError> {
        self.require(State::Registered, "destroy")?;
        self.state = State::Destroyed;
        self.delegate.with(|delegate| delegate.unregister())
    }
}

#[cfg(test)]
mod tests;
