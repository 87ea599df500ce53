//! Profile cache type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key: one profile per subject per service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileKey {
    pub subject_id: String,
    pub service: String,
}

impl ProfileKey {
    pub fn new(subject_id: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            service: service.into(),
        }
    }

    /// Key under which the shared tier stores this profile
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}:profile:{}:{}", prefix, self.service, self.subject_id)
    }

    /// Key of the counter advanced each time this profile is invalidated
    pub fn generation_key(&self, prefix: &str) -> String {
        format!("{}:gen:{}:{}", prefix, self.service, self.subject_id)
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.subject_id)
    }
}

/// Atomic cache statistics for lock-free hot path updates
#[derive(Debug, Default)]
pub struct AtomicCacheStats {
    /// Local tier hits
    pub local_hits: AtomicU64,
    /// Local tier misses (absent or expired)
    pub local_misses: AtomicU64,
    /// Shared tier hits
    pub shared_hits: AtomicU64,
    /// Profiles rebuilt from the identity authority
    pub rebuilds: AtomicU64,
    /// Entries dropped because their TTL elapsed
    pub expirations: AtomicU64,
    /// Entries dropped by invalidation events
    pub invalidations: AtomicU64,
    /// Lookups that ended in `CacheUnavailable`
    pub unavailable: AtomicU64,
    /// Rebuilt profiles not kept because an invalidation overtook them
    pub discarded: AtomicU64,
}

/// Cache statistics snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub local_hits: u64,
    pub local_misses: u64,
    pub shared_hits: u64,
    pub rebuilds: u64,
    pub expirations: u64,
    pub invalidations: u64,
    pub unavailable: u64,
    pub discarded: u64,
}

impl CacheStats {
    /// Fraction of lookups served without a rebuild
    pub fn hit_rate(&self) -> f64 {
        let hits = self.local_hits + self.shared_hits;
        let total = self.local_hits + self.local_misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl AtomicCacheStats {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            local_misses: self.local_misses.load(Ordering::Relaxed),
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Reset all stats to zero
    pub fn reset(&self) {
        for counter in [
            &self.local_hits,
            &self.local_misses,
            &self.shared_hits,
            &self.rebuilds,
            &self.expirations,
            &self.invalidations,
            &self.unavailable,
            &self.discarded,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
