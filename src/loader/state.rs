use super::{ServiceInfo, ServiceLoader};
use crate::service::ServiceState;

impl ServiceLoader {
    /// True if the service is registered and its last start completed.
    /// Only the running flag is consulted, not the backing object.
    pub fn is_running(&self, identity: &str) -> bool {
        self.registry
            .get(identity)
            .map(|descriptor| descriptor.is_running())
            .unwrap_or(false)
    }

    /// Resolved lifecycle state; unknown services are `Inactive`
    pub fn state_of(&self, identity: &str) -> ServiceState {
        self.registry
            .get(identity)
            .map(|descriptor| descriptor.current_state())
            .unwrap_or(ServiceState::Inactive)
    }

    /// Every registered service in startup order
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.registry
            .ordered_descriptors()
            .into_iter()
            .map(|descriptor| ServiceInfo {
                identity: descriptor.identity().clone(),
                sort_order: descriptor.sort_order(),
                kind: descriptor.kind(),
                is_async: descriptor.is_async(),
                state: descriptor.current_state(),
                running: descriptor.is_running(),
                disabled: self.gate.is_disabled(descriptor.identity().as_str()),
                started_at: descriptor.started_at(),
            })
            .collect()
    }
}
