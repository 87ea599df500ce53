//! Attribute cache client
//!
//! A per-process tier in front of a shared tier, kept coherent by the
//! invalidation protocol and bounded by a profile TTL.

pub mod invalidation;
pub mod manager;
pub mod store;
pub mod types;


pub use invalidation::{InvalidationBus, InvalidationEvent, InvalidationStream, LocalInvalidationBus};
pub use manager::ProfileCache;
pub use store::{MemoryProfileStore, ProfileSource, ProfileStore};
pub use types::{CacheStats, ProfileKey};

#[cfg(test)]
pub use store::{MockProfileSource, MockProfileStore};
