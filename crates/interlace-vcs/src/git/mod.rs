//! Built-in backend that shells out to the `git` executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use interlace_config::BootstrapProperties;
use interlace_config::keys::{VCS_BRANCH, VCS_REMOTE_URL, VCS_WORKING_COPY};

use crate::{VCS_TARGET, VcsApi, VcsError, VersionControl};

/// Implementation name of the built-in git backend.
pub const GIT_IMPLEMENTATION: &str = "git";

const DEFAULT_PROGRAM: &str = "git";

/// Git backend configured from `vcs.*` bootstrap properties.
#[derive(Debug, Clone)]
pub struct GitVersionControl {
    program: OsString,
    properties: BootstrapProperties,
}

impl Default for GitVersionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl GitVersionControl {
    /// Builds a backend that runs `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Builds a backend that runs the given executable instead of `git`.
    #[must_use]
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            properties: BootstrapProperties::new(),
        }
    }

    /// Registration constructor used by the loader.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches [`crate::VcsConstructor`].
    pub fn construct() -> Result<Box<dyn VersionControl>, VcsError> {
        Ok(Box::new(Self::new()))
    }

    fn required(&self, key: &'static str) -> Result<&str, VcsError> {
        self.properties
            .get_non_blank(key)
            .ok_or(VcsError::MissingProperty { key })
    }

    fn working_copy(&self) -> Result<PathBuf, VcsError> {
        self.required(VCS_WORKING_COPY).map(PathBuf::from)
    }

    pub(crate) fn checkout_args(&self) -> Result<Vec<OsString>, VcsError> {
        let mut args = vec![OsString::from("clone")];
        if let Some(branch) = self.properties.get_non_blank(VCS_BRANCH) {
            args.push(OsString::from("--branch"));
            args.push(OsString::from(branch));
        }
        args.push(OsString::from(self.required(VCS_REMOTE_URL)?));
        args.push(self.working_copy()?.into_os_string());
        Ok(args)
    }

    pub(crate) fn update_args(&self) -> Result<Vec<OsString>, VcsError> {
        Ok(vec![
            OsString::from("-C"),
            self.working_copy()?.into_os_string(),
            OsString::from("pull"),
            OsString::from("--ff-only"),
        ])
    }
}

impl VersionControl for GitVersionControl {
    fn implementation_name(&self) -> &str {
        GIT_IMPLEMENTATION
    }

    fn set_bootstrap_properties(&mut self, properties: &BootstrapProperties) {
        self.properties = properties.clone();
    }

    fn update(&self) -> Result<(), VcsError> {
        run(&self.program, &self.update_args()?).map(drop)
    }

    fn checkout(&self) -> Result<(), VcsError> {
        run(&self.program, &self.checkout_args()?).map(drop)
    }

    fn api(&self, properties: &BootstrapProperties) -> Result<Box<dyn VcsApi>, VcsError> {
        let working_copy = properties
            .get_non_blank(VCS_WORKING_COPY)
            .map(PathBuf::from)
            .ok_or(VcsError::MissingProperty {
                key: VCS_WORKING_COPY,
            })?;
        Ok(Box::new(GitApi {
            program: self.program.clone(),
            working_copy,
        }))
    }
}

struct GitApi {
    program: OsString,
    working_copy: PathBuf,
}

impl VcsApi for GitApi {
    fn working_copy(&self) -> &Path {
        &self.working_copy
    }

    fn current_revision(&self) -> Result<String, VcsError> {
        let args = [
            OsString::from("-C"),
            self.working_copy.clone().into_os_string(),
            OsString::from("rev-parse"),
            OsString::from("HEAD"),
        ];
        run(&self.program, &args).map(|stdout| stdout.trim().to_owned())
    }
}

fn run(program: &OsString, args: &[OsString]) -> Result<String, VcsError> {
    let command_line = describe(program, args);
    tracing::debug!(target: VCS_TARGET, command = %command_line, "running version control command");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| VcsError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source: Arc::new(source),
        })?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: command_line,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn describe(program: &OsString, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args)
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
