//! # hybrid-authz
//!
//! Hybrid role-based and attribute-based authorization core for services that
//! share one identity authority.
//!
//! ## Features
//!
//! - **Minimal tokens**: tokens carry a subject id and an expiry, nothing else
//! - **Two-tier attribute cache**: per-process tier in front of a shared Redis
//!   tier, kept coherent by pub/sub invalidation and bounded by a TTL
//! - **Named policies**: plain functions registered by name at startup
//! - **Fail closed**: missing mappings, missing policies, policy errors and
//!   cache outages all deny
//! - **Collection filters**: policies translate to backend-neutral predicates
//!   compiled to SQL or evaluated in memory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hybrid_authz::auth::builtin::{register_builtin_policies, register_builtin_translations};
//! use hybrid_authz::auth::{
//!     Authorizer, CollectionFilterTranslator, PermissionEvaluator, PolicyRegistry, TokenValidator,
//! };
//! use hybrid_authz::storage::AuthzStorage;
//! use hybrid_authz::utils::system_clock;
//! use hybrid_authz::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/hybrid-authz.yaml").await?;
//!     let clock = system_clock();
//!     let storage = AuthzStorage::connect(&config, clock.clone()).await?;
//!
//!     let mut registry = PolicyRegistry::new();
//!     register_builtin_policies(&mut registry)?;
//!     let registry = Arc::new(registry);
//!     let mut translator = CollectionFilterTranslator::new(registry.clone(), &config.filter);
//!     register_builtin_translations(&mut translator)?;
//!
//!     let authority = Arc::new(storage.identity_authority(clock.clone()));
//!     let cache = Arc::new(storage.profile_cache(&config, authority, clock.clone()));
//!     cache.spawn_invalidation_listener(storage.bus.as_ref()).await?;
//!
//!     let authorizer = Authorizer::new(
//!         "docs",
//!         Arc::new(TokenValidator::new(&config.auth, clock).await?),
//!         cache,
//!         PermissionEvaluator::new(registry),
//!         Arc::new(translator),
//!     );
//!
//!     let ctx = authorizer.authorize_header("Bearer eyJ...").await?;
//!     println!("{} degraded={}", ctx.subject_id(), ctx.is_degraded());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{AuthzError, Result, TokenRejection};

pub use auth::{
    AccessDecision, Authorizer, CollectionFilter, CollectionFilterTranslator, IdentityAuthority,
    PermissionEvaluator, PolicyRegistry, Predicate, RequestAuthContext, ServiceManifest,
    TokenIssuer, TokenValidator,
};
pub use core::models::{Authorizable, ResourceRecord, ResourceType, SubjectAttributes};
pub use core::profile_cache::ProfileCache;

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (unix seconds)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

/// Build information of this binary
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
