//! Manager variant backed by a version-controlled working copy.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use interlace_config::BootstrapProperties;
use interlace_config::keys::{VCS_IMPLEMENTATION, VCS_WORKING_COPY};
use interlace_vcs::VersionControl;

use super::{ConfigurationManager, ManagerContext, ManagerCore};
use crate::{Adapter, AdapterError, AdapterProxy, AdapterRegistry, ConfigLocation};

/// Manager that checks configuration out of version control before use.
///
/// Without an available backend it behaves like
/// [`super::ReadWriteManager`].
pub struct VersionControlledManager {
    core: ManagerCore,
    backend: Mutex<Option<Box<dyn VersionControl>>>,
}

impl VersionControlledManager {
    /// Builds an unconfigured manager.
    #[must_use]
    pub fn new(context: ManagerContext) -> Self {
        Self {
            core: ManagerCore::new(context),
            backend: Mutex::new(None),
        }
    }

    /// Name of the loaded backend, if any.
    #[must_use]
    pub fn implementation_name(&self) -> Option<String> {
        self.backend
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|backend| backend.implementation_name().to_owned())
    }

    fn load_backend(&self, properties: &BootstrapProperties) -> Option<Box<dyn VersionControl>> {
        let loader = &self.core.context.version_control;
        properties
            .get_non_blank(VCS_IMPLEMENTATION)
            .map_or_else(|| loader.load(), |name| loader.load_named(name))
    }

    fn sync_working_copy(
        backend: &dyn VersionControl,
        properties: &BootstrapProperties,
    ) -> Result<(), AdapterError> {
        let exists = working_copy(properties).is_some_and(|path| path.exists());
        if exists {
            backend.update()?;
        } else {
            backend.checkout()?;
        }
        match backend
            .api(properties)
            .and_then(|api| api.current_revision())
        {
            Ok(revision) => tracing::info!(
                target: crate::ADAPTER_TARGET,
                implementation = backend.implementation_name(),
                revision = %revision,
                updated = exists,
                "working copy ready"
            ),
            Err(error) => tracing::debug!(
                target: crate::ADAPTER_TARGET,
                implementation = backend.implementation_name(),
                %error,
                "working copy revision unavailable"
            ),
        }
        Ok(())
    }
}

fn working_copy(properties: &BootstrapProperties) -> Option<PathBuf> {
    properties.get_non_blank(VCS_WORKING_COPY).map(PathBuf::from)
}

impl ConfigurationManager for VersionControlledManager {
    fn configure(&self, properties: BootstrapProperties) -> Result<(), AdapterError> {
        let (stored, first) = self.core.configure(properties)?;
        if !first {
            return Ok(());
        }
        let Some(mut backend) = self.load_backend(stored) else {
            tracing::warn!(
                target: crate::ADAPTER_TARGET,
                requested = stored.get(VCS_IMPLEMENTATION),
                "no version control backend available; continuing without one"
            );
            return Ok(());
        };
        backend.set_bootstrap_properties(stored);
        Self::sync_working_copy(backend.as_ref(), stored)?;
        *self.backend.lock().unwrap_or_else(PoisonError::into_inner) = Some(backend);
        Ok(())
    }

    fn adapter_registry(&self) -> Result<Arc<dyn AdapterRegistry>, AdapterError> {
        self.core.adapter_registry()
    }

    fn create_adapter_from(
        &self,
        location: Option<ConfigLocation>,
    ) -> Result<AdapterProxy, AdapterError> {
        let properties = self.core.properties()?;
        let dir = working_copy(properties)
            .filter(|_| self.implementation_name().is_some())
            .unwrap_or_else(|| self.core.context.config_dir.clone());
        let resolved = location.map_or_else(|| self.core.resolve_location(&dir), Ok)?;
        self.core.create_adapter_at(&resolved)
    }

    fn sync_adapter_configuration(&self, adapter: &Adapter) -> Result<(), AdapterError> {
        self.core.replicate(adapter)
    }
}
