pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod samples;
pub mod service;

pub use config::{ConfigurationGate, LoaderConfig, LoggingConfig, SharedConfig};
pub use error::{Result, ServiceError};
pub use loader::{ServiceInfo, ServiceLoader, ShutdownReason};
pub use logging::LogGate;
pub use registry::{
    InstanceTable, QuittingSignal, ServiceCatalog, ServiceDescriptor, ServiceHandle, ServiceId, ServiceKind,
    ServiceRegistry, StaticEntry,
};
pub use service::{Service, ServiceState, Singleton};
