mod contract;
mod singleton;
mod state;

pub use contract::Service;
pub use singleton::Singleton;
pub use state::ServiceState;
