//! Discovery of version-control backends from an explicit registration list.

use crate::git::{GIT_IMPLEMENTATION, GitVersionControl};
use crate::{VCS_TARGET, VcsError, VersionControl};

/// Constructor invoked for every load of a registered backend.
pub type VcsConstructor = fn() -> Result<Box<dyn VersionControl>, VcsError>;

/// A named version-control backend constructor.
#[derive(Debug, Clone, Copy)]
pub struct VcsRegistration {
    /// Name the registration is listed under; used for discovery order,
    /// duplicate detection and diagnostics.
    pub name: &'static str,
    /// Builds a fresh backend instance.
    pub constructor: VcsConstructor,
}

impl VcsRegistration {
    /// Creates a registration.
    #[must_use]
    pub const fn new(name: &'static str, constructor: VcsConstructor) -> Self {
        Self { name, constructor }
    }

    fn construct(&self) -> Option<Box<dyn VersionControl>> {
        match (self.constructor)() {
            Ok(backend) => Some(backend),
            Err(error) => {
                tracing::warn!(
                    target: VCS_TARGET,
                    implementation = self.name,
                    %error,
                    "version control backend construction failed"
                );
                None
            }
        }
    }
}

/// Loads fresh version-control backends by name or priority.
#[derive(Debug, Clone)]
pub struct VersionControlLoader {
    registrations: Vec<VcsRegistration>,
}

impl VersionControlLoader {
    /// Builds a loader over `registrations`, keeping their order.
    ///
    /// A repeated name is ignored after its first occurrence.
    #[must_use]
    pub fn new(registrations: impl IntoIterator<Item = VcsRegistration>) -> Self {
        let mut unique: Vec<VcsRegistration> = Vec::new();
        for registration in registrations {
            if unique.iter().any(|known| known.name == registration.name) {
                tracing::warn!(
                    target: VCS_TARGET,
                    implementation = registration.name,
                    "duplicate version control registration ignored"
                );
                continue;
            }
            unique.push(registration);
        }
        Self {
            registrations: unique,
        }
    }

    /// Builds a loader over the built-in backends.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([VcsRegistration::new(
            GIT_IMPLEMENTATION,
            GitVersionControl::construct,
        )])
    }

    /// Names of every registered implementation in discovery order.
    #[must_use]
    pub fn available_implementations(&self) -> Vec<&'static str> {
        self.registrations
            .iter()
            .map(|registration| registration.name)
            .collect()
    }

    /// Loads a fresh instance of the first registered backend.
    #[must_use]
    pub fn load(&self) -> Option<Box<dyn VersionControl>> {
        let first = self.registrations.first()?;
        if self.registrations.len() > 1 {
            tracing::info!(
                target: VCS_TARGET,
                implementation = first.name,
                available = ?self.available_implementations(),
                "several version control backends available; using the first of many"
            );
        }
        first.construct()
    }

    /// Loads a fresh instance of the backend whose
    /// [`VersionControl::implementation_name`] equals `name`.
    ///
    /// Backends are constructed in discovery order and the first one that
    /// reports `name` wins. Instances that report another name are dropped.
    #[must_use]
    pub fn load_named(&self, name: &str) -> Option<Box<dyn VersionControl>> {
        for registration in &self.registrations {
            let Some(backend) = registration.construct() else {
                continue;
            };
            if backend.implementation_name() == name {
                return Some(backend);
            }
            if registration.name == name {
                tracing::warn!(
                    target: VCS_TARGET,
                    registered = registration.name,
                    reported = backend.implementation_name(),
                    "version control backend reports a different name than its registration"
                );
            }
        }
        tracing::debug!(
            target: VCS_TARGET,
            implementation = name,
            "no version control backend reports this name"
        );
        None
    }
}

impl Default for VersionControlLoader {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests;
