//! Two-tier attribute cache client
//!
//! Lookups go local tier → shared tier → identity authority. Both tiers are
//! read through the injected [`Clock`](crate::utils::time::Clock) so a profile
//! at or past its TTL is never returned, whatever the tier's own eviction
//! timing.

use super::invalidation::{InvalidationBus, InvalidationEvent};
use super::store::{ProfileSource, ProfileStore};
use super::types::{AtomicCacheStats, CacheStats, ProfileKey};
use crate::config::CacheConfig;
use crate::core::models::CachedProfile;
use crate::utils::error::{AuthzError, Result};
use crate::utils::time::SharedClock;
use futures::StreamExt;
use moka::future::Cache;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Attribute cache client
pub struct ProfileCache {
    /// Per-process tier
    local: Cache<ProfileKey, CachedProfile>,
    /// Cross-process tier
    shared: Arc<dyn ProfileStore>,
    /// Rebuild path on a full miss
    source: Arc<dyn ProfileSource>,
    clock: SharedClock,
    ttl: Duration,
    read_timeout: Duration,
    /// Bumped on every invalidation; a rebuild that straddles one is not kept locally
    epoch: AtomicU64,
    stats: Arc<AtomicCacheStats>,
}

impl ProfileCache {
    pub fn new(
        config: &CacheConfig,
        shared: Arc<dyn ProfileStore>,
        source: Arc<dyn ProfileSource>,
        clock: SharedClock,
    ) -> Self {
        let ttl = config.profile_ttl();
        let local = Cache::builder()
            .max_capacity(config.local_max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            local,
            shared,
            source,
            clock,
            ttl,
            read_timeout: config.read_timeout(),
            epoch: AtomicU64::new(0),
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    /// Profile TTL applied to newly built entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch the subject's profile within `service`
    ///
    /// Fails with `CacheUnavailable` when the shared tier or the rebuild errors
    /// or exceeds the read timeout. Never returns an expired profile.
    pub async fn get_profile(&self, subject_id: &str, service: &str) -> Result<CachedProfile> {
        let key = ProfileKey::new(subject_id, service);

        if let Some(profile) = self.local.get(&key).await {
            if !profile.is_expired(self.clock.now()) {
                AtomicCacheStats::incr(&self.stats.local_hits);
                return Ok(profile);
            }
            self.local.invalidate(&key).await;
            AtomicCacheStats::incr(&self.stats.expirations);
            debug!("Local profile for {} expired", key);
        }
        AtomicCacheStats::incr(&self.stats.local_misses);

        match tokio::time::timeout(self.read_timeout, self.read_through(&key)).await {
            Ok(Ok(profile)) => Ok(profile),
            Ok(Err(e)) => {
                AtomicCacheStats::incr(&self.stats.unavailable);
                warn!("Profile lookup for {} failed: {}", key, e);
                Err(AuthzError::cache_unavailable(format!(
                    "profile lookup for {} failed: {}",
                    key, e
                )))
            }
            Err(_) => {
                AtomicCacheStats::incr(&self.stats.unavailable);
                warn!(
                    "Profile lookup for {} timed out after {:?}",
                    key, self.read_timeout
                );
                Err(AuthzError::cache_unavailable(format!(
                    "profile lookup for {} timed out after {:?}",
                    key, self.read_timeout
                )))
            }
        }
    }

    async fn read_through(&self, key: &ProfileKey) -> Result<CachedProfile> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        if let Some(profile) = self.shared.get(key).await? {
            if !profile.is_expired(self.clock.now()) {
                AtomicCacheStats::incr(&self.stats.shared_hits);
                self.keep_locally(key, &profile, epoch).await;
                return Ok(profile);
            }
            debug!("Shared profile for {} expired", key);
        }

        // Read before loading so a mutation committed during the load is seen
        // as a generation change at write-back.
        let generation = self.shared.generation(key).await?;
        let subject = self
            .source
            .load_subject(&key.subject_id, &key.service)
            .await?;
        let profile = CachedProfile::new(subject, self.clock.now(), self.ttl);
        AtomicCacheStats::incr(&self.stats.rebuilds);
        debug!("Rebuilt profile for {}", key);

        match self.shared.put(&profile, generation).await {
            Ok(true) => self.keep_locally(key, &profile, epoch).await,
            Ok(false) => {
                AtomicCacheStats::incr(&self.stats.discarded);
                debug!("Invalidation overtook rebuild of {}; not caching", key);
            }
            Err(e) => {
                // A failed write-back only costs another rebuild on the next miss.
                warn!("Failed to write profile for {} to shared tier: {}", key, e);
                self.keep_locally(key, &profile, epoch).await;
            }
        }

        Ok(profile)
    }

    async fn keep_locally(&self, key: &ProfileKey, profile: &CachedProfile, epoch: u64) {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            AtomicCacheStats::incr(&self.stats.discarded);
            debug!("Invalidation raced lookup of {}; not caching locally", key);
            return;
        }
        self.local.insert(key.clone(), profile.clone()).await;
        // An invalidation landing between the check and the insert found
        // nothing to drop; undo the insert on its behalf.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.local.invalidate(key).await;
            AtomicCacheStats::incr(&self.stats.discarded);
            debug!("Invalidation raced insert of {}; dropped local copy", key);
        }
    }

    /// Drop the local copy of one profile
    pub async fn invalidate(&self, key: &ProfileKey) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.local.invalidate(key).await;
        AtomicCacheStats::incr(&self.stats.invalidations);
        debug!("Invalidated local profile for {}", key);
    }

    /// Drop every local profile
    pub fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.local.invalidate_all();
    }

    pub async fn handle_event(&self, event: &InvalidationEvent) {
        self.invalidate(&event.key()).await;
    }

    /// Subscribe to `bus` and apply events in a background task
    ///
    /// The subscription is established before this returns. When the stream
    /// ends the task exits and staleness falls back to the TTL bound.
    pub async fn spawn_invalidation_listener(
        self: &Arc<Self>,
        bus: &dyn InvalidationBus,
    ) -> Result<JoinHandle<()>> {
        let mut events = bus.subscribe().await?;
        let cache = Arc::clone(self);
        info!("Profile cache listening for invalidations");

        Ok(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                cache.handle_event(&event).await;
            }
            warn!("Invalidation stream closed; relying on profile TTL");
        }))
    }

    /// Local copy of a profile, if one is held
    pub async fn local_entry(&self, key: &ProfileKey) -> Option<CachedProfile> {
        self.local.get(key).await
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCache")
            .field("ttl", &self.ttl)
            .field("read_timeout", &self.read_timeout)
            .field("local_entries", &self.local.entry_count())
            .finish()
    }
}
