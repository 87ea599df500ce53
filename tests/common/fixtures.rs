//! Test fixtures
//!
//! A `docs` service manifest, a `document` resource type mapped to the
//! built-in policies, and a harness that wires storage, authority, cache,
//! evaluator and translator together the way a service does at startup.

use hybrid_authz::auth::builtin::{register_builtin_policies, register_builtin_translations};
use hybrid_authz::auth::authority::{IdentityAuthority, ServiceManifest};
use hybrid_authz::auth::{CollectionFilterTranslator, PermissionEvaluator, PolicyRegistry};
use hybrid_authz::config::{Config, DatabaseConfig};
use hybrid_authz::core::models::{AttributeType, ResourceRecord, ResourceType};
use hybrid_authz::core::profile_cache::{ProfileCache, ProfileKey};
use hybrid_authz::storage::AuthzStorage;
use hybrid_authz::utils::{ManualClock, SharedClock};
use std::sync::Arc;
use std::time::Duration;

pub const DOCS: &str = "docs";
pub const BILLING: &str = "billing";

/// Manifest of the document service
pub fn docs_manifest() -> ServiceManifest {
    ServiceManifest::new(DOCS)
        .role("editor", false)
        .role("admin", true)
        .attribute("department", AttributeType::String)
        .attribute_with_default("admin_group_ids", AttributeType::List, Vec::<String>::new())
}

/// Manifest of a second service sharing the same subjects
pub fn billing_manifest() -> ServiceManifest {
    ServiceManifest::new(BILLING)
        .role("admin", true)
        .attribute_with_default("spending_limit", AttributeType::Int, 0i64)
}

/// `document` with one action per built-in policy
pub fn document_type() -> Arc<ResourceType> {
    Arc::new(
        ResourceType::new("document")
            .action("view", "ownerOrGroupAdmin")
            .action("edit", "departmentEditor")
            .action("own", "ownerOnly")
            .action("purge", "adminOnly")
            .action("read", "authenticated"),
    )
}

pub fn document(id: &str) -> ResourceRecord {
    ResourceRecord::new(document_type(), id)
}

/// Test configuration: in-memory SQLite, no Redis
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.secret = Some("integration_secret_0123456789abcdefghij".to_string());
    config.storage.database = DatabaseConfig::in_memory();
    config.storage.redis.enabled = false;
    config
}

/// Everything a service builds at startup
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub config: Config,
    pub storage: AuthzStorage,
    pub authority: Arc<IdentityAuthority>,
    pub cache: Arc<ProfileCache>,
    pub evaluator: PermissionEvaluator,
    pub translator: Arc<CollectionFilterTranslator>,
}

impl Harness {
    /// Authority in SQLite, shared tier and bus in process
    pub async fn sqlite() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::starting_now());
        let shared: SharedClock = clock.clone();
        let storage = AuthzStorage::connect(&config, shared)
            .await
            .expect("Failed to connect test storage");
        Self::build(config, clock, storage).await
    }

    /// Everything in memory
    pub async fn in_memory() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::starting_now());
        Self::build(config, clock, AuthzStorage::in_memory()).await
    }

    async fn build(config: Config, clock: Arc<ManualClock>, storage: AuthzStorage) -> Self {
        let shared: SharedClock = clock.clone();

        let mut registry = PolicyRegistry::new();
        register_builtin_policies(&mut registry).expect("builtin policies");
        let registry = Arc::new(registry);
        let mut translator = CollectionFilterTranslator::new(registry.clone(), &config.filter);
        register_builtin_translations(&mut translator).expect("builtin translations");

        let authority = Arc::new(storage.identity_authority(shared.clone()));
        let cache = Arc::new(storage.profile_cache(&config, authority.clone(), shared));
        cache
            .spawn_invalidation_listener(storage.bus.as_ref())
            .await
            .expect("Failed to subscribe to invalidations");

        Self {
            clock,
            config,
            storage,
            authority,
            cache,
            evaluator: PermissionEvaluator::new(registry),
            translator: Arc::new(translator),
        }
    }

    /// Let the invalidation listener drain events already published
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    /// Wait until the listener has dropped the local copy of a profile
    pub async fn wait_for_local_eviction(&self, subject_id: &str, service: &str) {
        let key = ProfileKey::new(subject_id, service);
        for _ in 0..100 {
            if self.cache.local_entry(&key).await.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("local profile for {}/{} was never invalidated", service, subject_id);
    }
}
