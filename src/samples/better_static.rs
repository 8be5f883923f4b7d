use crate::error::{Result, ServiceError};
use crate::registry::ServiceCatalog;
use crate::service::Singleton;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

static INSTANCE: Singleton<BetterStaticServiceInstance> =
    Singleton::new("service_loader::samples::BetterStaticService");

/// Static front for a singleton instance that does the actual work.
///
/// Callers use the associated functions; the instance itself never leaves
/// this module.
pub struct BetterStaticService;

impl BetterStaticService {
    pub fn register(catalog: ServiceCatalog) -> ServiceCatalog {
        let quitting = catalog.quitting();
        catalog.static_async::<Self, _, _>("initialize", 20, move || {
            Self::initialize(quitting.token())
        })
    }

    async fn initialize(quitting: CancellationToken) -> Result<()> {
        if INSTANCE.is_initialized() {
            error!(
                "Trying to initialize {} but an instance is already running",
                INSTANCE.name()
            );
            return Ok(());
        }

        let instance = INSTANCE.install(BetterStaticServiceInstance::new())?;
        if let Err(e) = instance.initialize().await {
            error!("Failed to initialize {}: {}", INSTANCE.name(), e);
            INSTANCE.clear();
            return Err(e);
        }

        tokio::spawn(async move {
            quitting.cancelled().await;
            if INSTANCE.clear().is_some() {
                debug!("{} instance released", INSTANCE.name());
            }
        });

        Ok(())
    }

    pub fn is_initialized() -> bool {
        INSTANCE
            .get()
            .map(|instance| instance.is_initialized())
            .unwrap_or(false)
    }

    pub fn do_service_thing() -> Result<()> {
        let instance = Self::ready_instance("do_service_thing")?;
        instance.do_service_thing();
        Ok(())
    }

    pub async fn do_service_thing_async() -> Result<()> {
        let instance = Self::ready_instance("do_service_thing_async")?;
        instance.do_service_thing_async().await;
        Ok(())
    }

    fn ready_instance(operation: &str) -> Result<std::sync::Arc<BetterStaticServiceInstance>> {
        match INSTANCE.get() {
            Some(instance) if instance.is_initialized() => Ok(instance),
            _ => {
                error!(
                    "Trying to {} but the service instance is not yet initialized",
                    operation
                );
                Err(ServiceError::service(
                    INSTANCE.name(),
                    format!("{} called before initialization", operation),
                ))
            }
        }
    }
}

struct BetterStaticServiceInstance {
    initialized: AtomicBool,
}

impl BetterStaticServiceInstance {
    fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(ServiceError::already_initialized(INSTANCE.name()));
        }

        sleep(Duration::from_millis(250)).await;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn do_service_thing(&self) {
        debug!("Better static service doing its thing");
    }

    async fn do_service_thing_async(&self) {
        sleep(Duration::from_millis(10)).await;
        debug!("Better static service finished its async thing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_singleton_lifecycle() {
        assert!(BetterStaticService::do_service_thing().is_err());

        let quitting = CancellationToken::new();
        BetterStaticService::initialize(quitting.clone()).await.unwrap();
        assert!(BetterStaticService::is_initialized());
        BetterStaticService::do_service_thing().unwrap();
        BetterStaticService::do_service_thing_async().await.unwrap();

        // A second entry call is reported and ignored
        BetterStaticService::initialize(quitting.clone()).await.unwrap();
        assert!(BetterStaticService::is_initialized());

        quitting.cancel();
        for _ in 0..50 {
            if !BetterStaticService::is_initialized() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!BetterStaticService::is_initialized());
    }
}
