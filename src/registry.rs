//! Name → broadcaster directory used to subscribe to other resources.
//!
//! The trait is the boundary proxies depend on; [`InMemoryRegistry`] is the
//! embedded implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{NotFoundError, ValidationError};
use crate::listener::Handback;
use crate::notification::{ListenerId, NotificationEmitter, NotificationFilter, NotificationListener};
use crate::object_name::ObjectName;

/// Resolves broadcaster names.
pub trait BroadcasterRegistry: Send + Sync {
    /// Looks up a broadcaster.
    fn resolve(&self, name: &ObjectName) -> Option<Arc<dyn NotificationEmitter>>;

    /// Registers a listener with the named broadcaster.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Broadcaster` if `name` does not resolve.
    fn add_notification_listener(
        &self,
        name: &ObjectName,
        listener: Arc<dyn NotificationListener>,
        filter: Option<Box<dyn NotificationFilter>>,
        handback: Option<Arc<Handback>>,
    ) -> Result<ListenerId, NotFoundError> {
        let emitter = self
            .resolve(name)
            .ok_or_else(|| NotFoundError::Broadcaster { name: name.clone() })?;
        Ok(emitter.add_notification_listener(listener, filter, handback))
    }

    /// Removes a listener registration from the named broadcaster.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Broadcaster` if `name` does not resolve.
    fn remove_notification_listener(&self, name: &ObjectName, id: ListenerId) -> Result<bool, NotFoundError> {
        let emitter = self
            .resolve(name)
            .ok_or_else(|| NotFoundError::Broadcaster { name: name.clone() })?;
        Ok(emitter.remove_notification_listener(id))
    }
}

/// In-process registry keyed by [`ObjectName`].
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<ObjectName, Arc<dyn NotificationEmitter>>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `emitter` under its own name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DuplicateName` if the name is taken.
    pub fn register(&self, emitter: Arc<dyn NotificationEmitter>) -> Result<(), ValidationError> {
        let name = emitter.object_name().clone();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&name) {
            return Err(ValidationError::DuplicateName { name });
        }
        entries.insert(name, emitter);
        Ok(())
    }

    /// Removes a broadcaster. Existing listener registrations on it are left
    /// in place; they simply stop being reachable by name.
    pub fn unregister(&self, name: &ObjectName) -> Option<Arc<dyn NotificationEmitter>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &ObjectName) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<ObjectName> {
        let mut names: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl BroadcasterRegistry for InMemoryRegistry {
    fn resolve(&self, name: &ObjectName) -> Option<Arc<dyn NotificationEmitter>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
