use super::ServiceId;
use crate::service::Service;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A service instance built from the catalog, viewable both through the
/// service contract and as its concrete type
#[derive(Clone)]
pub(crate) struct BuiltInstance {
    service: Arc<dyn Service>,
    any: Arc<dyn Any + Send + Sync>,
}

impl BuiltInstance {
    pub(crate) fn new<T: Service>(instance: Arc<T>) -> Self {
        Self {
            service: Arc::clone(&instance) as Arc<dyn Service>,
            any: instance,
        }
    }

    pub(crate) fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }
}

/// Owner of the instances the catalog constructs.
///
/// The registry only keeps weak handles; an instance lives for as long as
/// this table (or anyone the application handed a clone to) keeps it.
#[derive(Default)]
pub struct InstanceTable {
    entries: HashMap<ServiceId, BuiltInstance>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, identity: ServiceId, instance: BuiltInstance) {
        self.entries.insert(identity, instance);
    }

    /// Drop the table's strong reference. Returns true if one was held.
    pub fn remove(&mut self, identity: &str) -> bool {
        self.entries.remove(identity).is_some()
    }

    /// Typed access to an instance by identity
    pub fn get<T: Service>(&self, identity: &str) -> Option<Arc<T>> {
        self.entries
            .get(identity)
            .and_then(|instance| Arc::clone(&instance.any).downcast::<T>().ok())
    }

    /// Typed access to the instance registered under `T`'s own identity
    pub fn find<T: Service>(&self) -> Option<Arc<T>> {
        self.get::<T>(ServiceId::of::<T>().as_str())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
