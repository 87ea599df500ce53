//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection management and health checks
//! - `cache` - Key-value operations backing the shared profile tier
//! - `pubsub` - Publish and subscribe for the invalidation channel
//! - `profile_store` - `ProfileStore` and `InvalidationBus` over Redis

mod cache;
mod pool;
mod profile_store;
mod pubsub;

pub use pool::RedisPool;
pub use profile_store::{RedisInvalidationBus, RedisProfileStore};
pub use pubsub::Subscription;
