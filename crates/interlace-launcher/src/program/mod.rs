//! Launch modes and the programs that implement them.

mod builtin;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use interlace_config::BootstrapProperties;
use interlace_management::ObjectRegistry;
use strum::{Display, EnumString};

use crate::{LaunchError, ModulePath, ShutdownSignal};

pub use builtin::{PasswordProgram, StandardProgram, WebConsoleProgram};

/// Program selected by the launcher's mode flags.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum LaunchMode {
    /// Runs the adapter with its management components.
    #[default]
    Standard,
    /// Runs the service self-test (`--service-test`).
    ServiceTest,
    /// Runs inside an application container (`--container`).
    Container,
    /// Runs as a failover standby (`--failover`).
    Failover,
    /// Obfuscates secrets for bootstrap properties (`--password`).
    PasswordUtility,
    /// Runs only the web console (`--webconsole-only`).
    WebConsoleOnly,
}

/// Everything a program needs from the launcher.
pub struct LaunchContext<'a> {
    /// Bootstrap properties after environment overrides.
    pub properties: &'a BootstrapProperties,
    /// Module path built for this launch.
    pub module_path: &'a ModulePath,
    /// Arguments the launcher did not recognise.
    pub arguments: &'a [String],
    /// Registry shared by every managed object of the process.
    pub objects: Arc<ObjectRegistry>,
    /// Blocks until the program should shut down.
    pub shutdown: &'a dyn ShutdownSignal,
    /// Destination for program output.
    pub output: &'a mut dyn Write,
}

impl fmt::Debug for LaunchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("module_path", &self.module_path)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// A program the launcher can hand control to.
pub trait MainProgram: Send + Sync {
    /// Human-readable program name.
    fn name(&self) -> &'static str;

    /// Runs the program to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the program cannot start or fails.
    fn run(&self, context: &mut LaunchContext<'_>) -> Result<(), LaunchError>;
}

/// Programs available per launch mode.
#[derive(Default)]
pub struct ProgramRegistry {
    programs: BTreeMap<LaunchMode, Box<dyn MainProgram>>,
}

impl fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.programs
                    .iter()
                    .map(|(mode, program)| (mode, program.name())),
            )
            .finish()
    }
}

impl ProgramRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in standard, web console and password
    /// programs.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(LaunchMode::Standard, StandardProgram::new())
            .with(LaunchMode::WebConsoleOnly, WebConsoleProgram)
            .with(LaunchMode::PasswordUtility, PasswordProgram)
    }

    /// Registers `program` for `mode`, replacing any earlier program.
    #[must_use]
    pub fn with(mut self, mode: LaunchMode, program: impl MainProgram + 'static) -> Self {
        self.programs.insert(mode, Box::new(program));
        self
    }

    /// Modes that have a program.
    #[must_use]
    pub fn modes(&self) -> Vec<LaunchMode> {
        self.programs.keys().copied().collect()
    }

    /// Program registered for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ProgramUnavailable`] when no program is
    /// registered for the mode.
    pub fn select(&self, mode: LaunchMode) -> Result<&dyn MainProgram, LaunchError> {
        self.programs
            .get(&mode)
            .map(AsRef::as_ref)
            .ok_or(LaunchError::ProgramUnavailable { mode })
    }
}

#[cfg(test)]
mod tests;
