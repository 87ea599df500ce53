//! End-to-end authorization scenarios
//!
//! Tokens, the attribute cache, invalidation and policy evaluation wired
//! together through the in-process bus.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{BILLING, DOCS, Harness, billing_manifest, docs_manifest, document};
    use async_trait::async_trait;
    use chrono::Duration;
    use hybrid_authz::auth::Authorizer;
    use hybrid_authz::auth::authority::{AuthorityStore, IdentityAuthority};
    use hybrid_authz::auth::jwt::{TokenIssuer, TokenValidator};
    use hybrid_authz::config::CacheConfig;
    use hybrid_authz::core::models::{CachedProfile, SubjectAttributes};
    use hybrid_authz::core::profile_cache::{ProfileCache, ProfileKey, ProfileSource, ProfileStore};
    use hybrid_authz::utils::{AuthzError, Result, SharedClock, TokenRejection};
    use std::sync::Arc;

    const SECRET: &[u8] = b"integration_test_secret_0123456789abcdef";

    /// Shared tier whose backend refuses every call
    struct UnreachableStore;

    #[async_trait]
    impl ProfileStore for UnreachableStore {
        async fn get(&self, _key: &ProfileKey) -> Result<Option<CachedProfile>> {
            Err(AuthzError::internal("connection refused"))
        }

        async fn generation(&self, _key: &ProfileKey) -> Result<u64> {
            Err(AuthzError::internal("connection refused"))
        }

        async fn put(&self, _profile: &CachedProfile, _generation: u64) -> Result<bool> {
            Err(AuthzError::internal("connection refused"))
        }

        async fn delete(&self, _key: &ProfileKey) -> Result<bool> {
            Err(AuthzError::internal("connection refused"))
        }
    }

    /// Shared tier that never answers
    struct HangingStore;

    #[async_trait]
    impl ProfileStore for HangingStore {
        async fn get(&self, _key: &ProfileKey) -> Result<Option<CachedProfile>> {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn generation(&self, _key: &ProfileKey) -> Result<u64> {
            Ok(0)
        }

        async fn put(&self, _profile: &CachedProfile, _generation: u64) -> Result<bool> {
            Ok(true)
        }

        async fn delete(&self, _key: &ProfileKey) -> Result<bool> {
            Ok(false)
        }
    }

    /// Authority read path that lingers after taking its snapshot
    struct LingeringAuthority(Arc<IdentityAuthority>);

    #[async_trait]
    impl ProfileSource for LingeringAuthority {
        async fn load_subject(
            &self,
            subject_id: &str,
            service: &str,
        ) -> Result<SubjectAttributes> {
            let subject = self.0.load_profile(subject_id, service).await?;
            tokio::time::sleep(std::time::Duration::from_millis(150)).await;
            Ok(subject)
        }
    }

    #[tokio::test]
    async fn test_department_editor_follows_object_department() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority
            .grant_role("alice", "editor", DOCS, "root", None)
            .await
            .unwrap();
        h.authority
            .set_attribute_str("alice", DOCS, "department", "Eng")
            .await
            .unwrap();

        let alice = h.cache.get_profile("alice", DOCS).await.unwrap().subject;
        let mut doc = document("d1").with_field("department", "Eng");
        assert!(h.evaluator.check_access(&alice, &doc, "edit"));

        doc.set_field("department", "Sales");
        assert!(!h.evaluator.check_access(&alice, &doc, "edit"));
    }

    #[tokio::test]
    async fn test_unreachable_cache_is_unavailable_and_denies() {
        let h = Harness::in_memory().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        let shared: SharedClock = h.clock.clone();
        let cache = ProfileCache::new(
            &h.config.cache,
            Arc::new(UnreachableStore),
            h.authority.clone(),
            shared,
        );

        let err = cache.get_profile("bob", DOCS).await.unwrap_err();
        assert!(matches!(err, AuthzError::CacheUnavailable(_)));
        assert_eq!(err.status_code(), 503);
        assert_eq!(cache.stats().unavailable, 1);

        let bob = SubjectAttributes::empty("bob", DOCS);
        let doc = document("d1")
            .owned_by("alice")
            .in_group("g1")
            .with_field("department", "Eng");
        for action in ["view", "edit", "own", "purge"] {
            assert!(!h.evaluator.check_access(&bob, &doc, action), "{} allowed", action);
        }
    }

    #[tokio::test]
    async fn test_slow_cache_times_out_as_unavailable() {
        let h = Harness::in_memory().await;
        let shared: SharedClock = h.clock.clone();
        let config = CacheConfig {
            read_timeout_ms: 50,
            ..CacheConfig::default()
        };
        let cache = ProfileCache::new(&config, Arc::new(HangingStore), h.authority.clone(), shared);

        let err = cache.get_profile("bob", DOCS).await.unwrap_err();
        assert!(matches!(err, AuthzError::CacheUnavailable(_)));
    }

    #[tokio::test]
    async fn test_revoked_admin_loses_access_despite_cached_profile() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority
            .grant_role("carol", "admin", DOCS, "root", None)
            .await
            .unwrap();
        h.settle().await;

        let doc = document("d1").owned_by("alice");
        let carol = h.cache.get_profile("carol", DOCS).await.unwrap().subject;
        assert!(h.evaluator.check_access(&carol, &doc, "purge"));
        assert!(
            h.cache
                .local_entry(&ProfileKey::new("carol", DOCS))
                .await
                .is_some()
        );

        assert!(h.authority.revoke_role("carol", "admin", DOCS).await.unwrap());
        h.wait_for_local_eviction("carol", DOCS).await;

        let carol = h.cache.get_profile("carol", DOCS).await.unwrap().subject;
        assert!(!carol.has_role("admin"));
        assert!(!h.evaluator.check_access(&carol, &doc, "purge"));
    }

    #[tokio::test]
    async fn test_invalidation_is_scoped_to_one_service() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority.register_manifest(&billing_manifest()).await.unwrap();
        h.authority
            .grant_role("carol", "admin", DOCS, "root", None)
            .await
            .unwrap();
        h.authority
            .grant_role("carol", "admin", BILLING, "root", None)
            .await
            .unwrap();
        h.settle().await;

        h.cache.get_profile("carol", DOCS).await.unwrap();
        h.cache.get_profile("carol", BILLING).await.unwrap();

        h.authority.revoke_role("carol", "admin", DOCS).await.unwrap();
        h.wait_for_local_eviction("carol", DOCS).await;

        let billing = h
            .cache
            .local_entry(&ProfileKey::new("carol", BILLING))
            .await
            .expect("billing profile evicted by a docs invalidation");
        assert!(billing.subject.has_role("admin"));
    }

    #[tokio::test]
    async fn test_profile_expires_after_ttl_without_invalidation() {
        let h = Harness::in_memory().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority
            .grant_role("dave", "editor", DOCS, "root", None)
            .await
            .unwrap();
        h.settle().await;
        h.cache.get_profile("dave", DOCS).await.unwrap();

        // Bypass invalidation: write straight to the authority store
        let mut assignments = h
            .storage
            .authority
            .list_role_assignments("dave", DOCS)
            .await
            .unwrap();
        let mut assignment = assignments.remove(0);
        assignment.role = "admin".to_string();
        h.storage.authority.upsert_role_assignment(&assignment).await.unwrap();

        h.clock.advance(Duration::seconds(299));
        let cached = h.cache.get_profile("dave", DOCS).await.unwrap();
        assert!(!cached.subject.has_role("admin"));

        h.clock.advance(Duration::seconds(1));
        let rebuilt = h.cache.get_profile("dave", DOCS).await.unwrap();
        assert!(rebuilt.subject.has_role("admin"));
        assert!(h.cache.stats().expirations >= 1);
    }

    #[tokio::test]
    async fn test_authorizer_end_to_end() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority
            .grant_role("alice", "editor", DOCS, "root", None)
            .await
            .unwrap();
        h.authority
            .set_attribute_str("alice", DOCS, "department", "Eng")
            .await
            .unwrap();

        let shared: SharedClock = h.clock.clone();
        let validator = Arc::new(TokenValidator::from_secret(SECRET, shared.clone()));
        let issuer = TokenIssuer::from_secret(SECRET, 3600, shared);
        let authorizer = Authorizer::new(
            DOCS,
            validator,
            h.cache.clone(),
            h.evaluator.clone(),
            h.translator.clone(),
        );

        let token = issuer.issue("alice").unwrap();
        let ctx = authorizer
            .authorize_header(&format!("Bearer {}", token))
            .await
            .unwrap();
        assert!(!ctx.is_degraded());
        assert!(ctx.require(&document("d1").with_field("department", "Eng"), "edit").is_ok());
        assert!(matches!(
            ctx.require(&document("d2").with_field("department", "Sales"), "edit"),
            Err(AuthzError::DecisionDenied(_))
        ));

        h.clock.advance(Duration::seconds(3600));
        let err = authorizer.authorize_request(&token).await.unwrap_err();
        assert!(matches!(err, AuthzError::Unauthenticated(TokenRejection::Expired)));
    }

    #[tokio::test]
    async fn test_revocation_during_rebuild_reaches_other_instances() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority
            .grant_role("carol", "admin", DOCS, "root", None)
            .await
            .unwrap();
        h.settle().await;

        let shared: SharedClock = h.clock.clone();
        let slow = Arc::new(h.storage.profile_cache(
            &h.config,
            Arc::new(LingeringAuthority(h.authority.clone())),
            shared.clone(),
        ));
        let lookup = tokio::spawn({
            let slow = slow.clone();
            async move { slow.get_profile("carol", DOCS).await }
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(h.authority.revoke_role("carol", "admin", DOCS).await.unwrap());
        lookup.await.unwrap().unwrap();

        let other = h.storage.profile_cache(&h.config, h.authority.clone(), shared);
        let carol = other.get_profile("carol", DOCS).await.unwrap().subject;
        assert!(!carol.has_role("admin"));
        assert!(!h.evaluator.check_access(&carol, &document("d1"), "purge"));
    }
}
