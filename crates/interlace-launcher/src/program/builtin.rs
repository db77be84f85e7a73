//! Built-in programs.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use interlace_adapter::{
    Adapter, ConfigurationManager, ConfigurationManagerKind, DEFAULT_CONFIG_DIR, ManagerContext,
};
use interlace_config::{BootstrapProperties, obfuscate};
use interlace_management::{ComponentFactory, ComponentSet, WEBCONSOLE_COMPONENT};

use super::{LaunchContext, MainProgram};
use crate::{LaunchError, ShutdownSignal};

/// Initialises and starts `components`, waits for shutdown, then stops and
/// destroys them.
///
/// Stop and destroy run even when start or the wait fails; the first error
/// is returned.
fn drive(
    components: &mut ComponentSet,
    properties: &BootstrapProperties,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    components.init_all(properties)?;
    let running = components
        .start_all()
        .map_err(LaunchError::from)
        .and_then(|()| {
            tracing::info!(
                target: crate::LAUNCHER_TARGET,
                components = ?components.names().collect::<Vec<_>>(),
                "management components started"
            );
            shutdown.wait()
        });
    let stopped = components.stop_all();
    let destroyed = components.destroy_all();
    running?;
    stopped?;
    destroyed?;
    Ok(())
}

/// Creates the adapter and runs the configured management components.
#[derive(Debug, Clone)]
pub struct StandardProgram {
    config_dir: PathBuf,
}

impl Default for StandardProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardProgram {
    /// Program reading its default configuration from `./config`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config_dir(DEFAULT_CONFIG_DIR)
    }

    /// Program reading its default configuration from `dir`.
    #[must_use]
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }
}

impl MainProgram for StandardProgram {
    fn name(&self) -> &'static str {
        "standard adapter"
    }

    fn run(&self, context: &mut LaunchContext<'_>) -> Result<(), LaunchError> {
        let properties = context.properties;
        let kind = ConfigurationManagerKind::from_properties(properties);
        let manager = kind.create(
            ManagerContext::new(Arc::clone(&context.objects)).with_config_dir(&self.config_dir),
        );
        manager.configure(properties.clone())?;
        let adapter = manager.create_adapter()?;
        tracing::info!(
            target: crate::LAUNCHER_TARGET,
            manager = %kind,
            id = adapter.unique_id(),
            source = %adapter.source(),
            "adapter created"
        );
        let served = serve_adapter(manager.as_ref(), &adapter, context);
        let destroyed = manager
            .adapter_registry()
            .and_then(|registry| registry.destroy_adapter(&adapter));
        if let Err(error) = &destroyed {
            tracing::warn!(
                target: crate::LAUNCHER_TARGET,
                id = adapter.unique_id(),
                %error,
                "adapter could not be released"
            );
        }
        served?;
        destroyed?;
        Ok(())
    }
}

/// Replicates the adapter and drives the management components. The caller
/// releases the adapter whatever this returns.
fn serve_adapter(
    manager: &dyn ConfigurationManager,
    adapter: &Adapter,
    context: &LaunchContext<'_>,
) -> Result<(), LaunchError> {
    if let Err(error) = manager.sync_adapter_configuration(adapter) {
        tracing::error!(
            target: crate::LAUNCHER_TARGET,
            id = adapter.unique_id(),
            %error,
            "adapter configuration replication failed"
        );
    }

    let factory = ComponentFactory::new(Arc::clone(&context.objects));
    let mut components = ComponentSet::from(factory.create(context.properties)?);
    drive(&mut components, context.properties, context.shutdown)
}

/// Runs only the web console component.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebConsoleProgram;

impl MainProgram for WebConsoleProgram {
    fn name(&self) -> &'static str {
        "web console"
    }

    fn run(&self, context: &mut LaunchContext<'_>) -> Result<(), LaunchError> {
        let factory = ComponentFactory::new(Arc::clone(&context.objects));
        let mut components = ComponentSet::from(vec![factory.create_named(WEBCONSOLE_COMPONENT)?]);
        drive(&mut components, context.properties, context.shutdown)
    }
}

/// Prints the `obf:` form of each argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordProgram;

impl MainProgram for PasswordProgram {
    fn name(&self) -> &'static str {
        "password utility"
    }

    fn run(&self, context: &mut LaunchContext<'_>) -> Result<(), LaunchError> {
        if context.arguments.is_empty() {
            return Err(LaunchError::MissingArgument {
                program: self.name(),
                expected: "at least one secret to obfuscate",
            });
        }
        for secret in context.arguments {
            writeln!(context.output, "{}", obfuscate(secret)).map_err(LaunchError::Output)?;
        }
        Ok(())
    }
}
