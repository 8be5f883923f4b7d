use super::ServiceId;
use crate::error::Result;
use crate::service::{Service, ServiceState};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

pub type SyncEntry = Arc<dyn Fn() -> Result<()> + Send + Sync>;
pub type AsyncEntry = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Zero-argument entry point of a static service
#[derive(Clone)]
pub enum StaticEntry {
    /// Runs to completion when invoked
    Sync(SyncEntry),
    /// Returns a future the loader awaits
    Async(AsyncEntry),
    /// Declared with a return shape the loader cannot drive
    Unsupported { return_type: String },
}

impl StaticEntry {
    pub fn sync<F>(entry: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        StaticEntry::Sync(Arc::new(entry))
    }

    pub fn from_async<F, Fut>(entry: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        StaticEntry::Async(Arc::new(move || entry().boxed()))
    }

    pub fn unsupported<S: Into<String>>(return_type: S) -> Self {
        StaticEntry::Unsupported {
            return_type: return_type.into(),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, StaticEntry::Async(_))
    }
}

impl fmt::Debug for StaticEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticEntry::Sync(_) => f.write_str("StaticEntry::Sync"),
            StaticEntry::Async(_) => f.write_str("StaticEntry::Async"),
            StaticEntry::Unsupported { return_type } => f
                .debug_struct("StaticEntry::Unsupported")
                .field("return_type", return_type)
                .finish(),
        }
    }
}

/// How the loader reaches a service
#[derive(Clone)]
pub enum ServiceHandle {
    /// Non-owning handle to an object-backed service; may stop resolving at
    /// any time
    Instanced(Weak<dyn Service>),
    Static(StaticEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceKind {
    Instanced,
    Static,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Instanced => f.write_str("Instanced"),
            ServiceKind::Static => f.write_str("Static"),
        }
    }
}

/// One registered service and its loader-side bookkeeping
pub struct ServiceDescriptor {
    identity: ServiceId,
    sort_order: i32,
    discovery_index: usize,
    handle: ServiceHandle,
    running: bool,
    static_state: ServiceState,
    started_at: Option<DateTime<Utc>>,
}

impl ServiceDescriptor {
    pub(crate) fn new(
        identity: ServiceId,
        sort_order: i32,
        discovery_index: usize,
        handle: ServiceHandle,
    ) -> Self {
        Self {
            identity,
            sort_order,
            discovery_index,
            handle,
            running: false,
            static_state: ServiceState::Inactive,
            started_at: None,
        }
    }

    pub fn identity(&self) -> &ServiceId {
        &self.identity
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn discovery_index(&self) -> usize {
        self.discovery_index
    }

    pub fn handle(&self) -> &ServiceHandle {
        &self.handle
    }

    pub fn kind(&self) -> ServiceKind {
        match self.handle {
            ServiceHandle::Instanced(_) => ServiceKind::Instanced,
            ServiceHandle::Static(_) => ServiceKind::Static,
        }
    }

    /// Instanced services always start asynchronously; static ones only when
    /// registered with an async entry
    pub fn is_async(&self) -> bool {
        match &self.handle {
            ServiceHandle::Instanced(_) => true,
            ServiceHandle::Static(entry) => entry.is_async(),
        }
    }

    /// Resolve the weak handle of an instanced service
    pub fn instance(&self) -> Option<Arc<dyn Service>> {
        match &self.handle {
            ServiceHandle::Instanced(service) => service.upgrade(),
            ServiceHandle::Static(_) => None,
        }
    }

    /// The running flag alone; the backing object is not consulted
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Resolved lifecycle state. Anything not flagged running is `Inactive`;
    /// a static service reports the state the loader recorded for it, an
    /// instanced one whatever its object reports, or `Inactive` once the
    /// object is gone.
    pub fn current_state(&self) -> ServiceState {
        if !self.running {
            return ServiceState::Inactive;
        }

        match &self.handle {
            ServiceHandle::Static(_) => self.static_state,
            ServiceHandle::Instanced(service) => service
                .upgrade()
                .map(|service| service.state())
                .unwrap_or(ServiceState::Inactive),
        }
    }

    pub(crate) fn set_static_state(&mut self, state: ServiceState) {
        self.static_state = state;
    }

    pub(crate) fn mark_running(&mut self) {
        self.running = true;
        self.started_at = Some(Utc::now());
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("identity", &self.identity)
            .field("sort_order", &self.sort_order)
            .field("kind", &self.kind())
            .field("running", &self.running)
            .field("static_state", &self.static_state)
            .finish()
    }
}
