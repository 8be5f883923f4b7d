//! Reference services showing the three ways to plug into the loader: an
//! object-backed service, a bare static entry point, and a static entry point
//! fronting a singleton instance.

mod basic_static;
mod better_static;
mod instanced;

pub use basic_static::BasicStaticService;
pub use better_static::BetterStaticService;
pub use instanced::InstancedService;

use crate::registry::ServiceCatalog;

/// Add every sample service to `catalog`
pub fn register(catalog: ServiceCatalog) -> ServiceCatalog {
    let catalog = catalog.instanced::<InstancedService>();
    let catalog = BasicStaticService::register(catalog);
    BetterStaticService::register(catalog)
}
