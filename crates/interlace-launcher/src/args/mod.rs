//! Launcher argument handling.
//!
//! Arguments are processed in two passes. Leading settings flags (see
//! [`SETTINGS_CLI_FLAGS`]) are split off for `ortho_config`. The remainder is
//! partitioned into launcher flags, which `clap` validates, and passthrough
//! arguments, which are handed untouched to the selected program.

use std::ffi::{OsStr, OsString};

use clap::Parser;
use interlace_config::SETTINGS_CLI_FLAGS;

use crate::{LaunchError, LaunchMode, ModulePathBuilder};

/// Delimiters accepted between `--module-path` entries.
pub const MODULE_PATH_DELIMITERS: &[char] = &[',', ':', ';'];

const VALUE_FLAGS: &[&str] = &["--module-path", "--classpath"];
const SWITCH_FLAGS: &[&str] = &[
    "--service-test",
    "--container",
    "--failover",
    "--password",
    "--webconsole-only",
    "--no-subdirs",
];

#[derive(Parser, Debug, Default)]
#[command(name = "interlace", disable_help_flag = true, disable_version_flag = true)]
struct LauncherCli {
    #[arg(long)]
    service_test: bool,
    #[arg(long)]
    container: bool,
    #[arg(long)]
    failover: bool,
    #[arg(long)]
    password: bool,
    #[arg(long)]
    webconsole_only: bool,
    #[arg(long, visible_alias = "classpath", value_name = "PATHS")]
    module_path: Option<String>,
    #[arg(long)]
    no_subdirs: bool,
}

impl LauncherCli {
    /// First requested mode in priority order.
    fn mode(&self) -> LaunchMode {
        [
            (self.service_test, LaunchMode::ServiceTest),
            (self.container, LaunchMode::Container),
            (self.failover, LaunchMode::Failover),
            (self.password, LaunchMode::PasswordUtility),
            (self.webconsole_only, LaunchMode::WebConsoleOnly),
        ]
        .into_iter()
        .find_map(|(requested, mode)| requested.then_some(mode))
        .unwrap_or_default()
    }
}

/// Parsed launcher arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArguments {
    mode: LaunchMode,
    module_path: Option<Vec<String>>,
    recursive: bool,
    passthrough: Vec<String>,
}

impl LaunchArguments {
    /// Parses launcher arguments. The first element is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Usage`] when a launcher flag is malformed, for
    /// example `--module-path` without a value.
    pub fn parse(args: &[OsString]) -> Result<Self, LaunchError> {
        let mut iter = args.iter().map(|arg| arg.to_string_lossy().into_owned());
        let program = iter.next().unwrap_or_else(|| "interlace".to_owned());
        let mut launcher = vec![program];
        let mut passthrough = Vec::new();

        while let Some(argument) = iter.next() {
            let flag = argument.split_once('=').map_or(argument.as_str(), |(flag, _)| flag);
            if VALUE_FLAGS.contains(&flag) {
                let inline = argument.contains('=');
                launcher.push(argument);
                if !inline && let Some(value) = iter.next() {
                    launcher.push(value);
                }
            } else if SWITCH_FLAGS.contains(&flag) {
                launcher.push(argument);
            } else {
                passthrough.push(argument);
            }
        }

        let cli = LauncherCli::try_parse_from(launcher).map_err(LaunchError::Usage)?;
        let module_path = cli.module_path.as_deref().map(|raw| {
            raw.split(MODULE_PATH_DELIMITERS)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect()
        });
        Ok(Self {
            mode: cli.mode(),
            module_path,
            recursive: !cli.no_subdirs,
            passthrough,
        })
    }

    /// Selected launch mode.
    #[must_use]
    pub const fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Explicit module path entries, if `--module-path` was given.
    #[must_use]
    pub fn module_path(&self) -> Option<&[String]> {
        self.module_path.as_deref()
    }

    /// Whether archive discovery recurses into subdirectories.
    #[must_use]
    pub const fn recursive(&self) -> bool {
        self.recursive
    }

    /// Arguments forwarded to the selected program.
    #[must_use]
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Builder for the module path these arguments describe.
    #[must_use]
    pub fn module_path_builder(&self) -> ModulePathBuilder {
        let builder = self
            .module_path
            .clone()
            .map_or_else(ModulePathBuilder::with_defaults, ModulePathBuilder::new);
        builder.recursive(self.recursive)
    }
}

/// Leading settings flags and the remaining arguments.
///
/// Both halves keep the program name as their first element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSplit {
    /// Arguments for the settings loader.
    pub settings: Vec<OsString>,
    /// Arguments for the launcher and the selected program.
    pub remaining: Vec<OsString>,
}

/// Splits leading settings flags from the rest of the command line.
///
/// Settings flags must precede every other argument. A settings flag that
/// appears later is left in place for the selected program.
#[must_use]
pub fn split_settings_arguments(args: &[OsString]) -> SettingsSplit {
    let mut iter = args.iter().peekable();
    let Some(program) = iter.next() else {
        return SettingsSplit::default();
    };
    let mut settings = vec![program.clone()];
    while let Some(argument) = iter.next_if(|argument| settings_flag(argument).is_some()) {
        settings.push(argument.clone());
        if settings_flag(argument) == Some(false)
            && let Some(value) = iter.next()
        {
            settings.push(value.clone());
        }
    }

    let mut remaining = vec![program.clone()];
    remaining.extend(iter.cloned());
    SettingsSplit {
        settings,
        remaining,
    }
}

/// `Some(inline)` when `argument` is a settings flag, where `inline` reports
/// a `--flag=value` form.
fn settings_flag(argument: &OsStr) -> Option<bool> {
    let text = argument.to_string_lossy();
    let (flag, inline) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(flag, _)| (flag, true));
    SETTINGS_CLI_FLAGS.contains(&flag).then_some(inline)
}

#[cfg(test)]
mod tests;
