//! Collection filter translator
//!
//! For a list query, yields a predicate that admits exactly the rows the
//! object-level policy would allow, so filtering can run inside the store.

use super::fallback::BoundedScan;
use super::predicate::Predicate;
use crate::auth::policy::PolicyRegistry;
use crate::config::{FallbackMode, FilterConfig};
use crate::core::models::{ResourceType, SubjectAttributes};
use crate::utils::error::{AuthzError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Builds a predicate from subject attributes for one policy
pub type TranslationFn = Arc<dyn Fn(&SubjectAttributes, &str) -> Predicate + Send + Sync>;

/// How a list query must be filtered
#[derive(Debug, Clone)]
pub enum CollectionFilter {
    /// Native predicate equivalent to the object-level policy
    Pushdown(Predicate),
    /// No translation exists; the result set is empty
    DenyAll { policy: String },
    /// No translation exists; rows are checked one by one, up to a bound
    BoundedScan(BoundedScan),
}

impl CollectionFilter {
    /// Predicate to push to the store
    ///
    /// For `BoundedScan` this is only a candidate pre-filter; the returned
    /// rows must still go through [`BoundedScan::evaluate`].
    pub fn query_predicate(&self) -> Predicate {
        match self {
            CollectionFilter::Pushdown(predicate) => predicate.clone(),
            CollectionFilter::DenyAll { .. } => Predicate::False,
            CollectionFilter::BoundedScan(scan) => scan.candidates.clone(),
        }
    }

    /// True when no row can pass
    pub fn is_empty(&self) -> bool {
        match self {
            CollectionFilter::Pushdown(predicate) => predicate.is_false(),
            CollectionFilter::DenyAll { .. } => true,
            CollectionFilter::BoundedScan(scan) => scan.candidates.is_false(),
        }
    }

    pub fn requires_scan(&self) -> bool {
        matches!(self, CollectionFilter::BoundedScan(_))
    }
}

/// Registry of per-policy translations
#[derive(Clone)]
pub struct CollectionFilterTranslator {
    registry: Arc<PolicyRegistry>,
    translations: HashMap<String, TranslationFn>,
    candidate_hints: HashMap<String, TranslationFn>,
    fallback: FallbackMode,
    max_scan_rows: usize,
}

impl CollectionFilterTranslator {
    pub fn new(registry: Arc<PolicyRegistry>, config: &FilterConfig) -> Self {
        Self {
            registry,
            translations: HashMap::new(),
            candidate_hints: HashMap::new(),
            fallback: config.fallback,
            max_scan_rows: config.max_scan_rows,
        }
    }

    /// Register the predicate translation of a policy
    ///
    /// The translation must admit exactly the rows the policy allows.
    pub fn register<F>(&mut self, policy: impl Into<String>, translation: F) -> Result<()>
    where
        F: Fn(&SubjectAttributes, &str) -> Predicate + Send + Sync + 'static,
    {
        let policy = policy.into();
        if self.translations.contains_key(&policy) {
            return Err(AuthzError::duplicate(format!(
                "translation for policy '{}' is already registered",
                policy
            )));
        }
        debug!("Registered filter translation for policy '{}'", policy);
        self.translations.insert(policy, Arc::new(translation));
        Ok(())
    }

    /// Register a candidate pre-filter for a policy without a translation
    ///
    /// The hint must admit every row the policy could allow; it narrows the
    /// bounded scan and is never used as the final filter.
    pub fn register_candidate_hint<F>(&mut self, policy: impl Into<String>, hint: F) -> Result<()>
    where
        F: Fn(&SubjectAttributes, &str) -> Predicate + Send + Sync + 'static,
    {
        let policy = policy.into();
        if self.candidate_hints.contains_key(&policy) {
            return Err(AuthzError::duplicate(format!(
                "candidate hint for policy '{}' is already registered",
                policy
            )));
        }
        self.candidate_hints.insert(policy, Arc::new(hint));
        Ok(())
    }

    pub fn has_translation(&self, policy: &str) -> bool {
        self.translations.contains_key(policy)
    }

    pub fn fallback_mode(&self) -> FallbackMode {
        self.fallback
    }

    /// Filter for listing `resource_type` rows `subject` may `action`
    pub fn filter_predicate(
        &self,
        subject: &SubjectAttributes,
        resource_type: &ResourceType,
        action: &str,
    ) -> CollectionFilter {
        let Some(policy) = resource_type.policy_for(action) else {
            debug!(
                "No policy maps action '{}' on '{}'; empty filter",
                action,
                resource_type.kind()
            );
            return CollectionFilter::Pushdown(Predicate::False);
        };

        // The evaluator denies on an unregistered policy, so must the filter.
        if !self.registry.contains(policy) {
            error!(
                "Policy '{}' mapped for '{}' on '{}' is not registered; empty filter",
                policy,
                action,
                resource_type.kind()
            );
            return CollectionFilter::Pushdown(Predicate::False);
        }

        if let Some(translate) = self.translations.get(policy) {
            return CollectionFilter::Pushdown(translate(subject, action).simplify());
        }

        match self.fallback {
            FallbackMode::DenyAll => {
                warn!(
                    "No filter translation for policy '{}' ({} on '{}'); denying all rows",
                    policy,
                    action,
                    resource_type.kind()
                );
                CollectionFilter::DenyAll {
                    policy: policy.to_string(),
                }
            }
            FallbackMode::BoundedScan => {
                warn!(
                    "No filter translation for policy '{}' ({} on '{}'); bounded scan of at most {} rows",
                    policy,
                    action,
                    resource_type.kind(),
                    self.max_scan_rows
                );
                let candidates = self
                    .candidate_hints
                    .get(policy)
                    .map(|hint| hint(subject, action).simplify())
                    .unwrap_or(Predicate::True);
                CollectionFilter::BoundedScan(BoundedScan {
                    policy: policy.to_string(),
                    action: action.to_string(),
                    candidates,
                    max_rows: self.max_scan_rows,
                })
            }
        }
    }
}

impl fmt::Debug for CollectionFilterTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut translations: Vec<&str> = self.translations.keys().map(String::as_str).collect();
        translations.sort_unstable();
        f.debug_struct("CollectionFilterTranslator")
            .field("translations", &translations)
            .field("fallback", &self.fallback)
            .field("max_scan_rows", &self.max_scan_rows)
            .finish()
    }
}
