//! Shared-tier storage and the profile rebuild source

use super::types::ProfileKey;
use crate::core::models::{CachedProfile, SubjectAttributes};
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Cross-process tier of the attribute cache
///
/// Implementations hold serialized profiles keyed by subject and service. The
/// Redis implementation lives in `storage::redis`.
///
/// Every key carries a generation that `delete` advances. A rebuild reads the
/// generation before loading from the authority and passes it to `put`, which
/// refuses the write once an invalidation has moved the generation on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, key: &ProfileKey) -> Result<Option<CachedProfile>>;

    /// Current generation of `key`; zero until it is first deleted
    async fn generation(&self, key: &ProfileKey) -> Result<u64>;

    /// Store `profile` if its key is still at `generation`; returns whether it was stored
    async fn put(&self, profile: &CachedProfile, generation: u64) -> Result<bool>;

    /// Remove the entry and advance the key's generation; returns whether an entry existed
    async fn delete(&self, key: &ProfileKey) -> Result<bool>;
}

/// Read path used to rebuild a profile on a full miss
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Project the subject's active roles and attributes within `service`
    async fn load_subject(&self, subject_id: &str, service: &str) -> Result<SubjectAttributes>;
}

/// In-process shared tier, used when Redis is disabled and in tests
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    entries: DashMap<ProfileKey, Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    profile: Option<CachedProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.profile.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &ProfileKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|slot| slot.profile.is_some())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, key: &ProfileKey) -> Result<Option<CachedProfile>> {
        Ok(self.entries.get(key).and_then(|slot| slot.profile.clone()))
    }

    async fn generation(&self, key: &ProfileKey) -> Result<u64> {
        Ok(self.entries.get(key).map_or(0, |slot| slot.generation))
    }

    async fn put(&self, profile: &CachedProfile, generation: u64) -> Result<bool> {
        let key = ProfileKey::new(profile.subject_id(), profile.service());
        // The shard lock is held across the compare and the write.
        let mut slot = self.entries.entry(key).or_default();
        if slot.generation != generation {
            return Ok(false);
        }
        slot.profile = Some(profile.clone());
        Ok(true)
    }

    async fn delete(&self, key: &ProfileKey) -> Result<bool> {
        let mut slot = self.entries.entry(key.clone()).or_default();
        slot.generation += 1;
        Ok(slot.profile.take().is_some())
    }
}
