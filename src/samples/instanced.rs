use crate::error::{Result, ServiceError};
use crate::registry::ServiceId;
use crate::service::{Service, ServiceState};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Object-backed sample service
pub struct InstancedService {
    state: RwLock<ServiceState>,
    warmup: Duration,
}

impl InstancedService {
    pub fn with_warmup(warmup: Duration) -> Self {
        Self {
            state: RwLock::new(ServiceState::Inactive),
            warmup,
        }
    }
}

impl Default for InstancedService {
    fn default() -> Self {
        Self::with_warmup(Duration::from_millis(250))
    }
}

#[async_trait]
impl Service for InstancedService {
    fn sort_order(&self) -> i32 {
        0
    }

    fn state(&self) -> ServiceState {
        *self.state.read()
    }

    async fn start(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            if !state.is_startable() {
                return Err(ServiceError::already_initialized(
                    ServiceId::of::<Self>().as_str(),
                ));
            }
            *state = ServiceState::Starting;
        }

        sleep(self.warmup).await;

        *self.state.write() = ServiceState::Running;
        debug!("Instanced sample service ready");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        *self.state.write() = ServiceState::Stopping;
        debug!("Instanced sample service releasing resources");
        *self.state.write() = ServiceState::Inactive;
        Ok(())
    }
}
