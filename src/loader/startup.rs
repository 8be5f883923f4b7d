use super::ServiceLoader;
use crate::error::{Result, ServiceError};
use crate::registry::{ServiceHandle, ServiceId, StaticEntry};
use crate::service::ServiceState;
use std::time::Instant;
use tracing::debug;

impl ServiceLoader {
    /// Start every registered service in ascending sort order.
    ///
    /// Each service finishes starting before the next one begins. A failure
    /// is returned immediately and the rest of the sequence is not attempted;
    /// services that already started stay running.
    pub async fn start_all(&mut self) -> Result<()> {
        self.log.message("Initializing all services...");

        self.discover()?;

        for identity in self.registry.ordered() {
            if self.is_running(identity.as_str()) {
                continue;
            }

            self.start_service(&identity).await?;
        }

        self.log.message("All services initialized");
        Ok(())
    }

    /// Start a single service immediately, ignoring sort order
    pub async fn start_one(&mut self, identity: &str) -> Result<()> {
        let Some(descriptor) = self.registry.get(identity) else {
            self.log.error(format!(
                "Trying to initialize {} but it is not a registered service",
                identity
            ));
            return Ok(());
        };

        if descriptor.is_running() {
            self.log.warning(format!(
                "Trying to initialize service {} but an instance is already running",
                identity
            ));
            return Ok(());
        }

        let identity = descriptor.identity().clone();
        self.start_service(&identity).await
    }

    async fn start_service(&mut self, identity: &ServiceId) -> Result<()> {
        let Some(descriptor) = self.registry.get(identity.as_str()) else {
            return Ok(());
        };

        if descriptor.is_running() {
            return Ok(());
        }

        if self.gate.is_disabled(identity.as_str()) {
            self.log.message(format!("Service ({}) is disabled", identity));
            return Ok(());
        }

        let handle = descriptor.handle().clone();
        match handle {
            ServiceHandle::Instanced(_) => {
                self.log
                    .message(format!("Loading instanced service {}...", identity))
            }
            ServiceHandle::Static(_) => {
                self.log
                    .message(format!("Loading static service {}...", identity))
            }
        }

        let started = Instant::now();
        if let Err(e) = self.invoke(identity, handle).await {
            self.log.error(format!(
                "Failed to initialize service {}: {}",
                identity, e
            ));
            return Err(e);
        }

        if let Some(descriptor) = self.registry.get_mut(identity.as_str()) {
            descriptor.mark_running();
        }

        self.log.message(format!(
            "{} initialized successfully in {:?}",
            identity,
            started.elapsed()
        ));
        Ok(())
    }

    async fn invoke(&mut self, identity: &ServiceId, handle: ServiceHandle) -> Result<()> {
        match handle {
            ServiceHandle::Instanced(service) => match service.upgrade() {
                Some(service) => service.start().await,
                None => {
                    debug!("Service {} no longer exists, nothing to start", identity);
                    Ok(())
                }
            },
            ServiceHandle::Static(StaticEntry::Sync(entry)) => entry(),
            ServiceHandle::Static(StaticEntry::Async(entry)) => {
                self.set_static_state(identity, ServiceState::Starting);

                match entry().await {
                    Ok(()) => {
                        self.set_static_state(identity, ServiceState::Running);
                        Ok(())
                    }
                    Err(e) => {
                        self.set_static_state(identity, ServiceState::Error);
                        Err(e)
                    }
                }
            }
            ServiceHandle::Static(StaticEntry::Unsupported { return_type }) => {
                let error = ServiceError::UnsupportedEntry {
                    identity: identity.to_string(),
                    return_type,
                };
                self.log
                    .error(format!("Failed to initialize service: {}", error));
                self.set_static_state(identity, ServiceState::Error);
                Ok(())
            }
        }
    }

    fn set_static_state(&mut self, identity: &ServiceId, state: ServiceState) {
        if let Some(descriptor) = self.registry.get_mut(identity.as_str()) {
            descriptor.set_static_state(state);
        }
    }
}
