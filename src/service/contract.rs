use super::ServiceState;
use crate::error::Result;
use async_trait::async_trait;

/// Contract for object-backed services.
///
/// The loader only ever holds a weak handle to an implementation, so all
/// mutation goes through `&self` and implementors keep their own state behind
/// interior mutability.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Position in the startup sequence. Lower values start first; leave gaps
    /// (10, 20, ...) so new services can be slotted in between.
    fn sort_order(&self) -> i32;

    /// Current lifecycle state as reported by the service itself
    fn state(&self) -> ServiceState;

    /// Bring the service up. Implementations should refuse to start while
    /// already `Starting` or `Running` with `ServiceError::AlreadyInitialized`.
    async fn start(&self) -> Result<()>;

    /// Tear the service down
    fn stop(&self) -> Result<()>;
}
