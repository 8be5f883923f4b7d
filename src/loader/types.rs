use crate::registry::{ServiceId, ServiceKind};
use crate::service::ServiceState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of one registered service for inspection surfaces
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub identity: ServiceId,
    pub sort_order: i32,
    pub kind: ServiceKind,
    pub is_async: bool,
    pub state: ServiceState,
    pub running: bool,
    pub disabled: bool,
    pub started_at: Option<DateTime<Utc>>,
}

/// Process shutdown reason
#[derive(Debug, Clone)]
pub enum ShutdownReason {
    Signal(String),
}
