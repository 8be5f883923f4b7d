use crate::error::Result;
use crate::registry::ServiceCatalog;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const WARMUP: Duration = Duration::from_millis(250);

/// Function-backed sample service with no instance of its own.
///
/// There is no stop operation for a static service, so cleanup is bound to
/// the loader's quitting token instead.
pub struct BasicStaticService;

impl BasicStaticService {
    pub fn register(catalog: ServiceCatalog) -> ServiceCatalog {
        let quitting = catalog.quitting();
        catalog.static_async::<Self, _, _>("initialize", 10, move || {
            Self::initialize(quitting.token())
        })
    }

    async fn initialize(quitting: CancellationToken) -> Result<()> {
        sleep(WARMUP).await;

        tokio::spawn(async move {
            quitting.cancelled().await;
            Self::cleanup();
        });

        Ok(())
    }

    pub fn do_static_service_thing() {
        info!("Doing static service thing...");
        info!("Static service thing done");
    }

    fn cleanup() {
        debug!("Basic static service cleaned up");
    }
}
