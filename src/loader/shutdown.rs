use super::ServiceLoader;
use crate::registry::ServiceId;
use tracing::debug;

impl ServiceLoader {
    /// Shut down every registered service, most recently ordered first.
    ///
    /// Stop failures are reported and do not interrupt the sweep; the
    /// registry is always empty afterwards. Returns the number of services
    /// whose stop operation failed.
    pub fn stop_all(&mut self) -> usize {
        self.log.message("Shutting down all services...");

        // Static services bind their cleanup to this
        self.quitting.cancel();

        let mut order = self.registry.ordered();
        order.reverse();

        let mut failures = 0;
        for identity in &order {
            if !self.shutdown_service(identity) {
                failures += 1;
            }
        }

        if failures == 0 {
            self.log.message("All services shut down successfully");
        } else {
            self.log.warning(format!(
                "All services shut down, {} stop operation(s) failed",
                failures
            ));
        }
        failures
    }

    /// Shut down one service and drop it from the registry.
    ///
    /// Returns false when the service's stop operation failed; the service
    /// is removed either way.
    pub fn stop_one(&mut self, identity: &str) -> bool {
        if !self.registry.contains(identity) {
            debug!("Service {} is not registered, nothing to stop", identity);
            return true;
        }

        self.shutdown_service(&ServiceId::from(identity))
    }

    fn shutdown_service(&mut self, identity: &ServiceId) -> bool {
        let Some(descriptor) = self.registry.remove(identity.as_str()) else {
            return true;
        };

        self.log.message(format!("Shutting down {}...", identity));

        // Resolve before the table lets go of a catalog-built instance
        let service = descriptor.instance();
        self.instances.remove(identity.as_str());

        let Some(service) = service else {
            self.log.message(format!("{} shut down successfully", identity));
            return true;
        };

        match service.stop() {
            Ok(()) => {
                self.log.message(format!("{} shut down successfully", identity));
                true
            }
            Err(e) => {
                self.log
                    .error(format!("Failed to shut down {}: {}", identity, e));
                false
            }
        }
    }
}
