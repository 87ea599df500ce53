//! Authorization system
//!
//! Identity authority, token validation, named policies, object-level
//! evaluation, collection filtering and the per-request context that ties
//! them together.

pub mod authority;
pub mod builtin;
pub mod context;
pub mod evaluator;
pub mod filter;
pub mod jwt;
pub mod policy;

pub use authority::{IdentityAuthority, ManifestReport, ServiceManifest};
pub use context::{Authorizer, RequestAuthContext};
pub use evaluator::{AccessDecision, DenialReason, PermissionEvaluator};
pub use filter::{CollectionFilter, CollectionFilterTranslator, Predicate};
pub use jwt::{TokenIssuer, TokenValidator};
pub use policy::PolicyRegistry;
