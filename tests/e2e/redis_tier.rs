//! Two attribute caches sharing one Redis, as two service processes would

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{DOCS, docs_manifest};
    use crate::skip_without_env;
    use hybrid_authz::auth::authority::{IdentityAuthority, MemoryAuthorityStore};
    use hybrid_authz::config::{CacheConfig, RedisConfig};
    use hybrid_authz::core::profile_cache::{ProfileCache, ProfileKey, ProfileStore};
    use hybrid_authz::storage::redis::{RedisInvalidationBus, RedisPool, RedisProfileStore};
    use hybrid_authz::utils::{SharedClock, system_clock};
    use std::sync::Arc;
    use std::time::Duration;

    const REDIS_URL_VAR: &str = "HYBRID_AUTHZ_TEST_REDIS_URL";

    async fn pool() -> RedisPool {
        let config = RedisConfig {
            url: std::env::var(REDIS_URL_VAR).unwrap(),
            enabled: true,
            connection_timeout: 5,
        };
        RedisPool::new(&config).await.expect("Redis not reachable")
    }

    async fn wait_for_eviction(cache: &ProfileCache, key: &ProfileKey) -> bool {
        for _ in 0..200 {
            if cache.local_entry(key).await.is_none() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    #[ignore]
    async fn test_revocation_reaches_every_process() {
        skip_without_env!(REDIS_URL_VAR);

        let clock: SharedClock = system_clock();
        let prefix = format!("hybrid-authz-test-{}", uuid::Uuid::new_v4());
        let cache_config = CacheConfig {
            key_prefix: prefix.clone(),
            ..CacheConfig::default()
        };

        let pool = pool().await;
        let shared = Arc::new(RedisProfileStore::new(pool.clone(), prefix.clone(), clock.clone()));
        let bus = Arc::new(RedisInvalidationBus::new(
            pool.clone(),
            cache_config.invalidation_channel(),
        ));
        let authority = Arc::new(IdentityAuthority::new(
            Arc::new(MemoryAuthorityStore::new()),
            shared.clone(),
            bus.clone(),
            clock.clone(),
        ));
        authority.register_manifest(&docs_manifest()).await.unwrap();
        authority
            .grant_role("carol", "admin", DOCS, "root", None)
            .await
            .unwrap();

        let first = Arc::new(ProfileCache::new(&cache_config, shared.clone(), authority.clone(), clock.clone()));
        let second = Arc::new(ProfileCache::new(&cache_config, shared.clone(), authority.clone(), clock.clone()));
        first.spawn_invalidation_listener(bus.as_ref()).await.unwrap();
        second.spawn_invalidation_listener(bus.as_ref()).await.unwrap();

        let key = ProfileKey::new("carol", DOCS);
        assert!(first.get_profile("carol", DOCS).await.unwrap().subject.has_role("admin"));
        assert!(second.get_profile("carol", DOCS).await.unwrap().subject.has_role("admin"));
        assert_eq!(second.stats().shared_hits, 1);

        authority.revoke_role("carol", "admin", DOCS).await.unwrap();
        assert!(shared.get(&key).await.unwrap().is_none());
        assert!(wait_for_eviction(&first, &key).await);
        assert!(wait_for_eviction(&second, &key).await);

        assert!(!first.get_profile("carol", DOCS).await.unwrap().subject.has_role("admin"));
    }
}
