//! Core data models
//!
//! Ground-truth records owned by the identity authority and the derived
//! profile projection consumed by policies.

pub mod resource;
pub mod service;
pub mod subject;
pub mod value;

pub use resource::{Authorizable, ResourceRecord, ResourceType, fields};
pub use service::{Attribute, AttributeAssignment, Role, RoleAssignment, Service};
pub use subject::{CachedProfile, SubjectAttributes};
pub use value::{AttributeType, AttributeValue};
