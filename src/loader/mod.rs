mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;


pub use orchestrator::ServiceLoader;
pub use types::{ServiceInfo, ShutdownReason};
