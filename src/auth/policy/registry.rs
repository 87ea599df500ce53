//! Policy registry

use super::types::{PolicyFn, PolicyOutcome};
use crate::core::models::{Authorizable, SubjectAttributes};
use crate::utils::error::{AuthzError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Process-wide map from policy name to policy function
///
/// Populated during startup, then shared read-only behind an `Arc`.
#[derive(Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, PolicyFn>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy under a unique name
    pub fn register<F>(&mut self, name: impl Into<String>, policy: F) -> Result<()>
    where
        F: Fn(&SubjectAttributes, &dyn Authorizable, &str) -> PolicyOutcome + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AuthzError::validation("policy name cannot be empty"));
        }
        if self.policies.contains_key(&name) {
            return Err(AuthzError::duplicate(format!(
                "policy '{}' is already registered",
                name
            )));
        }
        debug!("Registered policy '{}'", name);
        self.policies.insert(name, Arc::new(policy));
        Ok(())
    }

    /// Find a policy by name, `PolicyNotFound` when none is registered
    pub fn lookup(&self, name: &str) -> Result<PolicyFn> {
        self.policies
            .get(name)
            .cloned()
            .ok_or_else(|| AuthzError::policy_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.names())
            .finish()
    }
}
