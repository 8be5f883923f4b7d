use super::instances::BuiltInstance;
use super::{ServiceId, StaticEntry};
use crate::error::Result;
use crate::service::Service;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

pub(crate) type InstanceFactory = Arc<dyn Fn() -> Result<BuiltInstance> + Send + Sync>;

/// Application-shutdown signal handed to static services.
///
/// Holds the current quitting token. The loader cancels it on `stop_all` and
/// arms a fresh one when the registry is rebuilt, so entries must call
/// [`QuittingSignal::token`] when they run rather than keep an old token.
#[derive(Clone, Default)]
pub struct QuittingSignal {
    current: Arc<RwLock<CancellationToken>>,
}

impl QuittingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token of the current run
    pub fn token(&self) -> CancellationToken {
        self.current.read().clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.read().is_cancelled()
    }

    pub(crate) fn cancel(&self) {
        self.current.read().cancel();
    }

    /// Replace a cancelled token with a fresh one. Returns true if it did.
    pub(crate) fn rearm(&self) -> bool {
        let mut current = self.current.write();
        if !current.is_cancelled() {
            return false;
        }

        *current = CancellationToken::new();
        true
    }
}

pub(crate) enum Registration {
    /// Constructed during discovery and owned by the loader's instance table
    Factory {
        identity: ServiceId,
        factory: InstanceFactory,
    },
    /// Constructed and owned by the embedding application
    Provided {
        identity: ServiceId,
        sort_order: i32,
        service: Weak<dyn Service>,
    },
    Static {
        identity: ServiceId,
        sort_order: i32,
        entry: StaticEntry,
    },
}

impl Registration {
    pub(crate) fn identity(&self) -> &ServiceId {
        match self {
            Registration::Factory { identity, .. }
            | Registration::Provided { identity, .. }
            | Registration::Static { identity, .. } => identity,
        }
    }
}

/// Registration table the application assembles at composition time.
///
/// Order of registration is discovery order, which breaks ties between
/// services sharing a sort order. Registering the same identity twice keeps
/// the first registration.
pub struct ServiceCatalog {
    registrations: Vec<Registration>,
    quitting: QuittingSignal,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            quitting: QuittingSignal::new(),
        }
    }

    /// Signal cancelled when the loader shuts everything down. Static
    /// services have no stop operation and bind their cleanup to it.
    pub fn quitting(&self) -> QuittingSignal {
        self.quitting.clone()
    }

    /// Register an instanced service built with `Default` during discovery
    pub fn instanced<T: Service + Default>(self) -> Self {
        self.instanced_with(|| Ok(T::default()))
    }

    /// Register an instanced service built by `factory` during discovery
    pub fn instanced_with<T, F>(self, factory: F) -> Self
    where
        T: Service,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        self.instanced_as(ServiceId::of::<T>(), factory)
    }

    /// Register an instanced service under an explicit identity
    pub fn instanced_as<T, F>(mut self, identity: impl Into<ServiceId>, factory: F) -> Self
    where
        T: Service,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let factory: InstanceFactory =
            Arc::new(move || Ok(BuiltInstance::new(Arc::new(factory()?))));
        self.registrations.push(Registration::Factory {
            identity: identity.into(),
            factory,
        });
        self
    }

    /// Register an instance the application already owns. Only a weak handle
    /// is kept, so the service disappears from the loader's view when the
    /// application drops its last reference.
    pub fn instance<T: Service>(self, service: &Arc<T>) -> Self {
        self.instance_as(ServiceId::of::<T>(), service)
    }

    pub fn instance_as<T: Service>(mut self, identity: impl Into<ServiceId>, service: &Arc<T>) -> Self {
        let sort_order = service.sort_order();
        let weak: Weak<dyn Service> = Arc::downgrade(service) as Weak<dyn Service>;
        self.registrations.push(Registration::Provided {
            identity: identity.into(),
            sort_order,
            service: weak,
        });
        self
    }

    /// Register a synchronous static entry point `O::function`
    pub fn static_sync<O, F>(self, function: &str, sort_order: i32, entry: F) -> Self
    where
        O: ?Sized + 'static,
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.static_entry(ServiceId::entry::<O>(function), sort_order, StaticEntry::sync(entry))
    }

    /// Register an asynchronous static entry point `O::function`
    pub fn static_async<O, F, Fut>(self, function: &str, sort_order: i32, entry: F) -> Self
    where
        O: ?Sized + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.static_entry(
            ServiceId::entry::<O>(function),
            sort_order,
            StaticEntry::from_async(entry),
        )
    }

    pub fn static_entry(
        mut self,
        identity: impl Into<ServiceId>,
        sort_order: i32,
        entry: StaticEntry,
    ) -> Self {
        self.registrations.push(Registration::Static {
            identity: identity.into(),
            sort_order,
            entry,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub(crate) fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quitting_signal_rearms_only_after_cancel() {
        let signal = QuittingSignal::new();
        let first = signal.token();
        assert!(!signal.rearm());

        signal.cancel();
        assert!(first.is_cancelled());
        assert!(signal.is_cancelled());

        assert!(signal.rearm());
        assert!(!signal.is_cancelled());
        assert!(!signal.token().is_cancelled());
        assert!(first.is_cancelled());
    }

    #[test]
    fn test_catalog_clones_share_the_signal() {
        let catalog = ServiceCatalog::new();
        let handed_out = catalog.quitting();

        catalog.quitting().cancel();
        assert!(handed_out.is_cancelled());
        assert!(handed_out.token().is_cancelled());
    }
}
