//! Identity authority
//!
//! Service manifests, role and attribute assignments, and the profile
//! projection the attribute cache rebuilds from.

mod adapter;
mod manifest;
mod memory;
mod store;

pub use adapter::IdentityAuthority;
pub use manifest::{AttributeDeclaration, ManifestReport, RoleDeclaration, ServiceManifest};
pub use memory::MemoryAuthorityStore;
pub use store::AuthorityStore;
