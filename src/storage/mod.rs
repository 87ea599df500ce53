//! Storage layer for the authorization core
//!
//! The authority store is ground truth for roles and attributes; the shared
//! profile tier and invalidation bus back the attribute cache across
//! processes.

/// Database storage module
pub mod database;
/// Redis shared tier and invalidation channel
#[cfg(feature = "redis")]
pub mod redis;

use crate::auth::authority::{AuthorityStore, IdentityAuthority, MemoryAuthorityStore};
use crate::config::Config;
use crate::core::profile_cache::{
    InvalidationBus, LocalInvalidationBus, MemoryProfileStore, ProfileCache, ProfileSource,
    ProfileStore,
};
use crate::utils::error::Result;
use crate::utils::time::SharedClock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Storage backends selected from configuration
#[derive(Clone)]
pub struct AuthzStorage {
    /// Authority store (SQL or in-memory)
    pub authority: Arc<dyn AuthorityStore>,
    /// SQL database, when enabled
    pub database: Option<Arc<database::Database>>,
    /// Shared profile tier
    pub profiles: Arc<dyn ProfileStore>,
    /// Invalidation bus
    pub bus: Arc<dyn InvalidationBus>,
    /// Redis handle, when enabled
    #[cfg(feature = "redis")]
    pub redis: Option<redis::RedisPool>,
}

/// Health of each configured backend
#[derive(Debug, Clone, Serialize)]
pub struct StorageHealthStatus {
    pub database: bool,
    pub redis: bool,
    pub overall: bool,
}

impl AuthzStorage {
    /// Connect every configured backend
    ///
    /// A disabled database keeps the authority in memory; disabled Redis keeps
    /// the shared tier and invalidation in-process. An enabled backend that
    /// cannot be reached is an error.
    pub async fn connect(config: &Config, clock: SharedClock) -> Result<Self> {
        info!("Initializing storage layer");

        let database = if config.storage.database.enabled {
            debug!("Connecting to database");
            let db = database::Database::connect_and_migrate(&config.storage.database).await?;
            Some(Arc::new(db))
        } else {
            warn!("Database disabled; authority state is kept in memory and lost on exit");
            None
        };
        let authority: Arc<dyn AuthorityStore> = match &database {
            Some(db) => db.clone(),
            None => Arc::new(MemoryAuthorityStore::new()),
        };

        #[cfg(feature = "redis")]
        if config.storage.redis.enabled {
            debug!("Connecting to Redis");
            let pool = redis::RedisPool::new(&config.storage.redis).await?;
            let profiles =
                redis::RedisProfileStore::new(pool.clone(), config.cache.key_prefix.clone(), clock);
            let bus =
                redis::RedisInvalidationBus::new(pool.clone(), config.cache.invalidation_channel());
            info!("Storage layer initialized (shared tier: redis)");
            return Ok(Self {
                authority,
                database,
                profiles: Arc::new(profiles),
                bus: Arc::new(bus),
                redis: Some(pool),
            });
        }

        #[cfg(not(feature = "redis"))]
        let _ = clock;
        warn!("Redis disabled; profiles and invalidations stay within this process");
        info!("Storage layer initialized (shared tier: memory)");
        Ok(Self {
            authority,
            database,
            profiles: Arc::new(MemoryProfileStore::new()),
            bus: Arc::new(LocalInvalidationBus::default()),
            #[cfg(feature = "redis")]
            redis: None,
        })
    }

    /// Everything in process memory
    pub fn in_memory() -> Self {
        Self {
            authority: Arc::new(MemoryAuthorityStore::new()),
            database: None,
            profiles: Arc::new(MemoryProfileStore::new()),
            bus: Arc::new(LocalInvalidationBus::default()),
            #[cfg(feature = "redis")]
            redis: None,
        }
    }

    /// Identity authority over these backends
    pub fn identity_authority(&self, clock: SharedClock) -> IdentityAuthority {
        IdentityAuthority::new(
            self.authority.clone(),
            self.profiles.clone(),
            self.bus.clone(),
            clock,
        )
    }

    /// Attribute cache over the shared tier, rebuilding from `source`
    pub fn profile_cache(
        &self,
        config: &Config,
        source: Arc<dyn ProfileSource>,
        clock: SharedClock,
    ) -> ProfileCache {
        ProfileCache::new(&config.cache, self.profiles.clone(), source, clock)
    }

    /// Health check for all configured backends
    pub async fn health_check(&self) -> StorageHealthStatus {
        let database = match &self.database {
            Some(db) => match db.health_check().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Database health check failed: {}", e);
                    false
                }
            },
            None => true,
        };

        #[cfg(feature = "redis")]
        let redis = match &self.redis {
            Some(pool) => match pool.health_check().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Redis health check failed: {}", e);
                    false
                }
            },
            None => true,
        };
        #[cfg(not(feature = "redis"))]
        let redis = true;

        StorageHealthStatus {
            database,
            redis,
            overall: database && redis,
        }
    }
}

impl std::fmt::Debug for AuthzStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthzStorage")
            .field("database", &self.database.is_some())
            .finish_non_exhaustive()
    }
}
