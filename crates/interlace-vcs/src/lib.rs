//! Version-control backends for configuration kept in a repository.
//!
//! Backends implement [`VersionControl`] and are made known to the
//! [`VersionControlLoader`] through an explicit list of
//! [`VcsRegistration`]s. Every load invokes the registered constructor again,
//! so callers never share a backend instance.

mod api;
mod error;
mod git;
mod loader;

pub use api::{VcsApi, VersionControl};
pub use error::VcsError;
pub use git::{GIT_IMPLEMENTATION, GitVersionControl};
pub use loader::{VcsConstructor, VcsRegistration, VersionControlLoader};

pub(crate) const VCS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::loader");
