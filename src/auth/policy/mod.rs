//! Named policy registry
//!
//! Policies are plain functions of subject attributes, a resource and an
//! action. Resource types refer to them by name.

mod registry;
mod types;

pub use registry::PolicyRegistry;
pub use types::{PolicyError, PolicyFn, PolicyOutcome};
