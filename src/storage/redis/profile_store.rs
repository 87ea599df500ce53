//! Redis-backed shared profile tier and invalidation channel

use super::pool::RedisPool;
use crate::core::models::CachedProfile;
use crate::core::profile_cache::{
    InvalidationBus, InvalidationEvent, InvalidationStream, ProfileKey, ProfileStore,
};
use crate::utils::error::{AuthzError, Result};
use crate::utils::time::SharedClock;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};

/// Generation counters outlive any in-flight rebuild by a wide margin
const GENERATION_TTL_SECS: i64 = 86_400;

/// KEYS[1] profile, KEYS[2] generation; ARGV generation, payload, ttl
const PUT_IF_GENERATION: &str = r"
local current = tonumber(redis.call('GET', KEYS[2]) or '0')
if current ~= tonumber(ARGV[1]) then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
";

/// Profiles stored as JSON under `{prefix}:profile:{service}:{subject_id}`
#[derive(Debug, Clone)]
pub struct RedisProfileStore {
    pool: RedisPool,
    prefix: String,
    clock: SharedClock,
}

impl RedisProfileStore {
    pub fn new(pool: RedisPool, prefix: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
            clock,
        }
    }

    fn key(&self, key: &ProfileKey) -> String {
        key.storage_key(&self.prefix)
    }

    fn generation_key(&self, key: &ProfileKey) -> String {
        key.generation_key(&self.prefix)
    }
}

#[async_trait]
impl ProfileStore for RedisProfileStore {
    async fn get(&self, key: &ProfileKey) -> Result<Option<CachedProfile>> {
        let Some(raw) = self.pool.get(&self.key(key)).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<CachedProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                // Unreadable entries are treated as absent and rebuilt.
                warn!("Discarding malformed shared profile for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn generation(&self, key: &ProfileKey) -> Result<u64> {
        let Some(raw) = self.pool.get(&self.generation_key(key)).await? else {
            return Ok(0);
        };
        raw.parse().map_err(|e| {
            AuthzError::internal(format!("Corrupt profile generation for {}: {}", key, e))
        })
    }

    async fn put(&self, profile: &CachedProfile, generation: u64) -> Result<bool> {
        let key = ProfileKey::new(profile.subject_id(), profile.service());
        let ttl = profile.remaining_ttl(self.clock.now());
        if ttl == 0 {
            debug!("Not storing already expired profile for {}", key);
            return Ok(false);
        }
        let payload = serde_json::to_string(profile)?;

        let script = redis::Script::new(PUT_IF_GENERATION);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(self.key(&key))
            .key(self.generation_key(&key))
            .arg(generation)
            .arg(payload)
            .arg(ttl);
        let mut conn = self.pool.connection();
        let stored: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(stored == 1)
    }

    async fn delete(&self, key: &ProfileKey) -> Result<bool> {
        let generation_key = self.generation_key(key);
        let mut conn = self.pool.connection();
        let (removed, generation): (u64, u64) = redis::pipe()
            .atomic()
            .del(self.key(key))
            .incr(&generation_key, 1)
            .expire(&generation_key, GENERATION_TTL_SECS)
            .ignore()
            .query_async(&mut conn)
            .await?;
        debug!("Shared profile for {} now at generation {}", key, generation);
        Ok(removed > 0)
    }
}

/// Invalidation events as JSON on a Redis pub/sub channel
#[derive(Debug, Clone)]
pub struct RedisInvalidationBus {
    pool: RedisPool,
    channel: String,
}

impl RedisInvalidationBus {
    pub fn new(pool: RedisPool, channel: impl Into<String>) -> Self {
        Self {
            pool,
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl InvalidationBus for RedisInvalidationBus {
    async fn publish(&self, event: &InvalidationEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let receivers = self.pool.publish(&self.channel, &payload).await?;
        debug!(
            "Published invalidation for {}/{} to {} receivers",
            event.service, event.subject_id, receivers
        );
        Ok(())
    }

    async fn subscribe(&self) -> Result<InvalidationStream> {
        let subscription = self.pool.subscribe(&[self.channel.clone()]).await?;
        let events = subscription.into_stream().filter_map(|msg| async move {
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Unreadable invalidation message: {}", e);
                    return None;
                }
            };
            match serde_json::from_str::<InvalidationEvent>(&payload) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Malformed invalidation payload {:?}: {}", payload, e);
                    None
                }
            }
        });
        Ok(events.boxed())
    }
}
