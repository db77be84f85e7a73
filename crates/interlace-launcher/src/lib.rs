//! Bootstrap launcher for the Interlace integration adapter.
//!
//! [`run`] loads launcher settings, installs logging, reads the bootstrap
//! properties, builds the module path and hands control to the
//! [`MainProgram`] selected by the mode flags. Selection and discovery are
//! pure; programs own every lifecycle decision.

mod args;
mod error;
mod module_path;
mod program;
mod shutdown;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use interlace_config::keys::LOGGING_CONFIG_URL;
use interlace_config::{BootstrapProperties, ENV_PREFIX, LauncherSettings};
use interlace_logging::LoggingSelector;
use interlace_management::ObjectRegistry;
use ortho_config::OrthoConfig;

pub use args::{
    LaunchArguments, MODULE_PATH_DELIMITERS, SettingsSplit, split_settings_arguments,
};
pub use error::LaunchError;
pub use module_path::{
    ArchivePathEntry, DEFAULT_MODULE_PATH, ModulePath, ModulePathBuilder, SKIPPED_DIRECTORIES,
};
pub use program::{
    LaunchContext, LaunchMode, MainProgram, PasswordProgram, ProgramRegistry, StandardProgram,
    WebConsoleProgram,
};
pub use shutdown::{ImmediateShutdown, ShutdownSignal, SystemShutdownSignal};

pub(crate) const LAUNCHER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Runs the launcher with the process defaults and reports an exit code.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let args: Vec<OsString> = args.into_iter().collect();
    match launch(&args, stdout, &ProgramRegistry::standard(), &SystemShutdownSignal) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: LAUNCHER_TARGET, %error, "launch failed");
            drop(writeln!(stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

/// Runs one launch with explicit programs and shutdown signal.
///
/// # Errors
///
/// Returns a [`LaunchError`] when settings, logging, properties or argument
/// handling fail, when the selected mode has no program, or when the
/// program itself fails.
pub fn launch<W: Write>(
    args: &[OsString],
    stdout: &mut W,
    programs: &ProgramRegistry,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let split = split_settings_arguments(args);
    let settings =
        LauncherSettings::load_from_iter(split.settings).map_err(LaunchError::Settings)?;
    interlace_logging::install(settings.log_filter(), settings.log_format())?;
    interlace_logging::bridge_log();

    let arguments = LaunchArguments::parse(&split.remaining)?;
    let properties = load_properties(&settings)?;
    let selector = LoggingSelector::standard();
    configure_logging(&selector, &properties);

    let outcome = run_program(&arguments, &properties, programs, shutdown, stdout);
    selector.configurator().request_shutdown();
    outcome
}

fn run_program<W: Write>(
    arguments: &LaunchArguments,
    properties: &BootstrapProperties,
    programs: &ProgramRegistry,
    shutdown: &dyn ShutdownSignal,
    stdout: &mut W,
) -> Result<(), LaunchError> {
    let program = programs.select(arguments.mode())?;
    let module_path = arguments.module_path_builder().build();
    tracing::info!(
        target: LAUNCHER_TARGET,
        mode = %arguments.mode(),
        program = program.name(),
        module_path = %module_path,
        "launching"
    );
    let mut context = LaunchContext {
        properties,
        module_path: &module_path,
        arguments: arguments.passthrough(),
        objects: ObjectRegistry::shared(),
        shutdown,
        output: stdout,
    };
    program.run(&mut context)
}

/// Reads bootstrap properties and applies `INTERLACE_*` overrides.
///
/// A missing file at the default location yields empty properties; a
/// missing file that was named explicitly is an error.
fn load_properties(settings: &LauncherSettings) -> Result<BootstrapProperties, LaunchError> {
    let path = settings.bootstrap_properties();
    let base = if settings.bootstrap_properties.is_none() && !path.exists() {
        tracing::warn!(
            target: LAUNCHER_TARGET,
            path = %path.display(),
            "bootstrap properties not found; using built-in defaults"
        );
        BootstrapProperties::new()
    } else {
        BootstrapProperties::load(path)?
    };
    Ok(base.with_environment_overrides(ENV_PREFIX))
}

fn configure_logging(selector: &LoggingSelector, properties: &BootstrapProperties) {
    let backend = selector.configurator();
    let applied = properties.get_non_blank(LOGGING_CONFIG_URL).map_or_else(
        || backend.default_initialisation(),
        |source| backend.initialise_from(source),
    );
    tracing::debug!(
        target: LAUNCHER_TARGET,
        backend = backend.name(),
        applied,
        "logging backend configured"
    );
}
