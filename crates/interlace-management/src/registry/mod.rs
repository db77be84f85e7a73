//! Process-wide registry of managed objects.
//!
//! Components publish themselves here so that remote tooling (the connector
//! server and the web console) can enumerate and inspect them. Names are
//! unique: registering an occupied name or removing an absent one is an
//! error rather than a silent overwrite.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::{ManagementError, ObjectName};

/// Attribute map exposed by a managed object.
pub type Attributes = BTreeMap<String, Value>;

/// An object exposed to management tooling.
pub trait ManagedObject: Send + Sync {
    /// Short type label, for example `ConnectorServer`.
    fn kind(&self) -> &str;

    /// Current attribute snapshot.
    fn attributes(&self) -> Attributes;
}

/// Thread-safe name → object registry.
#[derive(Default)]
pub struct ObjectRegistry {
    objects: Mutex<BTreeMap<ObjectName, Arc<dyn ManagedObject>>>,
}

impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry behind an [`Arc`] for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<ObjectName, Arc<dyn ManagedObject>>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `object` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::AlreadyRegistered`] when the name is taken.
    pub fn register(
        &self,
        name: ObjectName,
        object: Arc<dyn ManagedObject>,
    ) -> Result<(), ManagementError> {
        let mut objects = self.objects();
        if objects.contains_key(&name) {
            return Err(ManagementError::AlreadyRegistered {
                name: name.to_string(),
            });
        }
        tracing::debug!(target: crate::MANAGEMENT_TARGET, name = %name, kind = object.kind(), "object registered");
        objects.insert(name, object);
        Ok(())
    }

    /// Removes the object published under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::NotRegistered`] when nothing is registered
    /// under the name.
    pub fn unregister(&self, name: &ObjectName) -> Result<Arc<dyn ManagedObject>, ManagementError> {
        let removed = self
            .objects()
            .remove(name)
            .ok_or_else(|| ManagementError::NotRegistered {
                name: name.to_string(),
            })?;
        tracing::debug!(target: crate::MANAGEMENT_TARGET, name = %name, "object unregistered");
        Ok(removed)
    }

    /// Returns `true` when an object is registered under `name`.
    #[must_use]
    pub fn is_registered(&self, name: &ObjectName) -> bool {
        self.objects().contains_key(name)
    }

    /// Returns the object registered under `name`.
    #[must_use]
    pub fn get(&self, name: &ObjectName) -> Option<Arc<dyn ManagedObject>> {
        self.objects().get(name).cloned()
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<ObjectName> {
        self.objects().keys().cloned().collect()
    }

    /// Attribute snapshot for the object registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::NotRegistered`] when the name is unknown.
    pub fn attributes(&self, name: &ObjectName) -> Result<Attributes, ManagementError> {
        self.get(name)
            .map(|object| object.attributes())
            .ok_or_else(|| ManagementError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Number of registered objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}
