use super::catalog::Registration;
use super::{InstanceTable, ServiceCatalog, ServiceHandle, ServiceRegistry};
use crate::error::{Result, ServiceError};
use std::sync::Arc;
use tracing::debug;

/// Result of one discovery pass over a catalog
pub(crate) struct Discovery {
    pub registry: ServiceRegistry,
    pub instances: InstanceTable,
}

impl ServiceCatalog {
    /// Build a fresh registry from the registration table, constructing every
    /// instanced service the catalog owns.
    ///
    /// A failing constructor aborts the whole pass.
    pub(crate) fn discover(&self) -> Result<Discovery> {
        let mut registry = ServiceRegistry::new();
        let mut instances = InstanceTable::new();

        for registration in self.registrations() {
            let identity = registration.identity();
            if registry.contains(identity.as_str()) {
                debug!("Dropping duplicate registration of {}", identity);
                continue;
            }

            match registration {
                Registration::Factory { identity, factory } => {
                    let built = factory()
                        .map_err(|e| ServiceError::construction(identity.as_str(), e.to_string()))?;
                    let sort_order = built.service().sort_order();
                    let handle = ServiceHandle::Instanced(Arc::downgrade(built.service()));

                    registry.insert(identity.clone(), sort_order, handle);
                    instances.insert(identity.clone(), built);
                    debug!("Discovered instanced service {} ({})", identity, sort_order);
                }
                Registration::Provided {
                    identity,
                    sort_order,
                    service,
                } => {
                    registry.insert(
                        identity.clone(),
                        *sort_order,
                        ServiceHandle::Instanced(service.clone()),
                    );
                    debug!("Discovered provided service {} ({})", identity, sort_order);
                }
                Registration::Static {
                    identity,
                    sort_order,
                    entry,
                } => {
                    registry.insert(
                        identity.clone(),
                        *sort_order,
                        ServiceHandle::Static(entry.clone()),
                    );
                    debug!("Discovered static service {} ({})", identity, sort_order);
                }
            }
        }

        Ok(Discovery {
            registry,
            instances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceKind;
    use crate::service::{Service, ServiceState};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Cache;

    #[async_trait]
    impl Service for Cache {
        fn sort_order(&self) -> i32 {
            5
        }

        fn state(&self) -> ServiceState {
            ServiceState::Inactive
        }

        async fn start(&self) -> Result<()> {
            Ok(())
        }

        fn stop(&self) -> Result<()> {
            Ok(())
        }
    }

    struct Audio;

    #[test]
    fn test_discovery_builds_registry_and_instances() {
        let catalog = ServiceCatalog::new()
            .instanced::<Cache>()
            .static_sync::<Audio, _>("initialize", 10, || Ok(()));

        let discovery = catalog.discover().unwrap();
        assert_eq!(discovery.registry.len(), 2);
        assert_eq!(discovery.instances.len(), 1);

        let cache = discovery
            .registry
            .get(crate::registry::ServiceId::of::<Cache>().as_str())
            .unwrap();
        assert_eq!(cache.kind(), ServiceKind::Instanced);
        assert_eq!(cache.sort_order(), 5);
        assert!(cache.instance().is_some());
        assert!(discovery.instances.find::<Cache>().is_some());
    }

    #[test]
    fn test_duplicates_are_not_constructed() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        let catalog = ServiceCatalog::new()
            .instanced::<Cache>()
            .instanced_with(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Cache)
            });

        let discovery = catalog.discover().unwrap();
        assert_eq!(discovery.registry.len(), 1);
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_construction_failure_is_fatal() {
        let catalog = ServiceCatalog::new()
            .instanced::<Cache>()
            .instanced_as("broken", || -> Result<Cache> {
                Err(ServiceError::system("no backing store"))
            });

        match catalog.discover() {
            Err(ServiceError::Construction { identity, message }) => {
                assert_eq!(identity, "broken");
                assert!(message.contains("no backing store"));
            }
            Err(e) => panic!("Unexpected discovery error: {}", e),
            Ok(_) => panic!("Discovery should fail when a constructor fails"),
        }
    }

    #[test]
    fn test_discovery_drops_catalog_built_instances_with_table() {
        let catalog = ServiceCatalog::new().instanced::<Cache>();
        let discovery = catalog.discover().unwrap();
        let Discovery {
            registry,
            instances,
        } = discovery;

        let identity = crate::registry::ServiceId::of::<Cache>();
        assert!(registry.get(identity.as_str()).unwrap().instance().is_some());

        drop(instances);
        assert!(registry.get(identity.as_str()).unwrap().instance().is_none());
    }
}
