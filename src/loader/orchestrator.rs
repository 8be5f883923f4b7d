use crate::config::ConfigurationGate;
use crate::error::Result;
use crate::logging::LogGate;
use crate::registry::{InstanceTable, QuittingSignal, ServiceCatalog, ServiceRegistry};
use crate::service::Service;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owns the registration table, the registry built from it and the ordered
/// start/stop of every registered service.
///
/// All operations take `&mut self`, so startup, shutdown and registry
/// rebuilds never interleave with each other.
pub struct ServiceLoader {
    pub(super) catalog: ServiceCatalog,
    pub(super) gate: Arc<dyn ConfigurationGate>,
    pub(super) log: LogGate,

    // Discovery output
    pub(super) registry: ServiceRegistry,
    pub(super) instances: InstanceTable,
    pub(super) registry_built: bool,

    pub(super) quitting: QuittingSignal,
}

impl ServiceLoader {
    /// Create a loader over `catalog`. Nothing is constructed until the first
    /// discovery.
    pub fn new(catalog: ServiceCatalog, gate: Arc<dyn ConfigurationGate>) -> Self {
        let quitting = catalog.quitting();

        Self {
            catalog,
            log: LogGate::new(Arc::clone(&gate)),
            gate,
            registry: ServiceRegistry::new(),
            instances: InstanceTable::new(),
            registry_built: false,
            quitting,
        }
    }

    /// Build the registry unless it already exists
    pub fn discover(&mut self) -> Result<()> {
        if self.registry_built {
            return Ok(());
        }

        self.rebuild()
    }

    /// Throw the registry away and build it again from the catalog.
    ///
    /// Running services lose their bookkeeping; catalog-built instances are
    /// replaced by fresh ones.
    pub fn refresh(&mut self) -> Result<()> {
        let running = self.registry.iter().filter(|d| d.is_running()).count();
        if running > 0 {
            self.log.warning(format!(
                "Refreshing service registry with {} service(s) still running",
                running
            ));
        }

        self.registry_built = false;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        let discovery = self.catalog.discover().map_err(|e| {
            self.log.error(format!("Service discovery failed: {}", e));
            e
        })?;

        self.registry = discovery.registry;
        self.instances = discovery.instances;
        self.registry_built = true;

        // A previous stop_all cancelled the last run's token
        if self.quitting.rearm() {
            debug!("Quitting token re-armed for the rebuilt registry");
        }

        self.log.message(format!(
            "Discovered {} service(s), {} constructed",
            self.registry.len(),
            self.instances.len()
        ));
        Ok(())
    }

    /// Boot hook: start everything when the configuration asks for it
    pub async fn boot(&mut self) -> Result<()> {
        if !self.gate.auto_start_on_boot() {
            return Ok(());
        }

        self.log.message("Auto-initializing...");
        self.start_all().await
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn is_registry_built(&self) -> bool {
        self.registry_built
    }

    /// Typed access to a catalog-built instance
    pub fn instance<T: Service>(&self) -> Option<Arc<T>> {
        self.instances.find::<T>()
    }

    /// Drop the loader's own strong reference to a catalog-built instance.
    ///
    /// The registry entry stays; once nobody else holds the instance its
    /// state reads as inactive.
    pub fn release(&mut self, identity: &str) -> bool {
        self.instances.remove(identity)
    }

    /// Token of the current run, cancelled when all services are shut down
    pub fn quitting(&self) -> CancellationToken {
        self.quitting.token()
    }
}
