use crate::error::{Result, ServiceError};
use parking_lot::RwLock;
use std::sync::Arc;

/// A process-wide slot holding the one live instance behind a static service.
///
/// The static entry point installs the instance once; every other public
/// function of the service reads it through [`Singleton::get`]. A second
/// install while an instance is present is rejected.
pub struct Singleton<T> {
    name: &'static str,
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Singleton<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: parking_lot::const_rwlock(None),
        }
    }

    /// Install the instance, failing if one is already present
    pub fn install(&self, value: T) -> Result<Arc<T>> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(ServiceError::already_initialized(self.name));
        }

        let instance = Arc::new(value);
        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Remove the instance, allowing a later install
    pub fn clear(&self) -> Option<Arc<T>> {
        self.slot.write().take()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
