mod catalog;
mod descriptor;
mod discovery;
mod instances;

pub use catalog::{QuittingSignal, ServiceCatalog};
pub use descriptor::{AsyncEntry, ServiceDescriptor, ServiceHandle, ServiceKind, StaticEntry, SyncEntry};
pub use instances::InstanceTable;

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a registered service.
///
/// Instanced services are keyed by their type name, static entry points by
/// their owning type name plus the entry function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new<S: Into<String>>(identity: S) -> Self {
        Self(identity.into())
    }

    /// Identity of an instanced service type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    /// Identity of a static entry function declared on `O`
    pub fn entry<O: ?Sized + 'static>(function: &str) -> Self {
        Self(format!("{}::{}", std::any::type_name::<O>(), function))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceId {
    fn from(identity: &str) -> Self {
        Self::new(identity)
    }
}

impl From<String> for ServiceId {
    fn from(identity: String) -> Self {
        Self(identity)
    }
}

/// Descriptors keyed by identity, remembering the order they were discovered
#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<ServiceId, ServiceDescriptor>,
    next_index: usize,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. The first registration of an identity wins; a later
    /// duplicate is refused and `false` is returned.
    pub fn insert(&mut self, identity: ServiceId, sort_order: i32, handle: ServiceHandle) -> bool {
        if self.entries.contains_key(&identity) {
            return false;
        }

        let descriptor =
            ServiceDescriptor::new(identity.clone(), sort_order, self.next_index, handle);
        self.next_index += 1;
        self.entries.insert(identity, descriptor);
        true
    }

    pub fn get(&self, identity: &str) -> Option<&ServiceDescriptor> {
        self.entries.get(identity)
    }

    pub(crate) fn get_mut(&mut self, identity: &str) -> Option<&mut ServiceDescriptor> {
        self.entries.get_mut(identity)
    }

    pub fn remove(&mut self, identity: &str) -> Option<ServiceDescriptor> {
        self.entries.remove(identity)
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

    /// Identities ordered by ascending sort order, ties in discovery order
    pub fn ordered(&self) -> Vec<ServiceId> {
        self.ordered_descriptors()
            .into_iter()
            .map(|descriptor| descriptor.identity().clone())
            .collect()
    }

    /// Descriptors ordered by ascending sort order, ties in discovery order
    pub fn ordered_descriptors(&self) -> Vec<&ServiceDescriptor> {
        let mut descriptors: Vec<&ServiceDescriptor> = self.entries.values().collect();
        descriptors.sort_by_key(|descriptor| (descriptor.sort_order(), descriptor.discovery_index()));
        descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_entry() -> ServiceHandle {
        ServiceHandle::Static(StaticEntry::sync(|| Ok(())))
    }

    #[test]
    fn test_identity_formats() {
        struct Audio;

        let instanced = ServiceId::of::<Audio>();
        assert!(instanced.as_str().ends_with("Audio"));

        let entry = ServiceId::entry::<Audio>("initialize");
        assert_eq!(entry.as_str(), format!("{}::initialize", instanced));
    }

    #[test]
    fn test_ordering_is_stable_on_ties() {
        let mut registry = ServiceRegistry::new();
        registry.insert("c".into(), 20, noop_entry());
        registry.insert("a".into(), 10, noop_entry());
        registry.insert("d".into(), 20, noop_entry());
        registry.insert("b".into(), -5, noop_entry());
        registry.insert("e".into(), 10, noop_entry());

        let order: Vec<String> = registry
            .ordered()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(order, vec!["b", "a", "e", "c", "d"]);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.insert("a".into(), 10, noop_entry()));
        assert!(!registry.insert("a".into(), -100, noop_entry()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").map(|d| d.sort_order()), Some(10));
    }

    #[test]
    fn test_remove() {
        let mut registry = ServiceRegistry::new();
        registry.insert("a".into(), 0, noop_entry());

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }
}
