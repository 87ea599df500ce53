//! Object-level permission evaluation

use super::decision::{AccessDecision, DenialReason};
use crate::auth::policy::PolicyRegistry;
use crate::core::models::{Authorizable, SubjectAttributes};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, error};

/// Decides single-resource access by running the mapped policy
///
/// Never errors: a missing mapping, a missing policy, a policy error or a
/// policy panic all deny.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    registry: Arc<PolicyRegistry>,
}

impl PermissionEvaluator {
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Whether `subject` may perform `action` on `resource`
    pub fn check_access(
        &self,
        subject: &SubjectAttributes,
        resource: &dyn Authorizable,
        action: &str,
    ) -> bool {
        self.check_access_detailed(subject, resource, action).allowed
    }

    /// Like [`check_access`](Self::check_access), with the reason for a denial
    pub fn check_access_detailed(
        &self,
        subject: &SubjectAttributes,
        resource: &dyn Authorizable,
        action: &str,
    ) -> AccessDecision {
        let Some(policy_name) = resource.resource_type().policy_for(action) else {
            debug!(
                "No policy maps action '{}' on '{}'; denying",
                action,
                resource.kind()
            );
            return AccessDecision::deny(
                None,
                DenialReason::NoPolicyForAction {
                    kind: resource.kind().to_string(),
                    action: action.to_string(),
                },
            );
        };
        let policy_name = policy_name.to_string();

        let policy = match self.registry.lookup(&policy_name) {
            Ok(policy) => policy,
            Err(e) => {
                error!(
                    "{} (mapped for '{}' on '{}'); denying",
                    e,
                    action,
                    resource.kind()
                );
                return AccessDecision::deny(
                    Some(policy_name.clone()),
                    DenialReason::PolicyNotRegistered {
                        policy: policy_name,
                    },
                );
            }
        };

        match catch_unwind(AssertUnwindSafe(|| policy(subject, resource, action))) {
            Ok(Ok(true)) => AccessDecision::allow(policy_name),
            Ok(Ok(false)) => {
                debug!(
                    "Policy '{}' rejected {} for '{}' on {} {}",
                    policy_name,
                    subject.id(),
                    action,
                    resource.kind(),
                    resource.resource_id()
                );
                AccessDecision::deny(
                    Some(policy_name.clone()),
                    DenialReason::Rejected {
                        policy: policy_name,
                    },
                )
            }
            Ok(Err(e)) => {
                error!(
                    "Policy '{}' failed for {} on {} {}: {}",
                    policy_name,
                    subject.id(),
                    resource.kind(),
                    resource.resource_id(),
                    e
                );
                AccessDecision::deny(
                    Some(policy_name.clone()),
                    DenialReason::PolicyFailed {
                        policy: policy_name,
                        error: e.to_string(),
                    },
                )
            }
            Err(_) => {
                error!(
                    "Policy '{}' panicked for {} on {} {}",
                    policy_name,
                    subject.id(),
                    resource.kind(),
                    resource.resource_id()
                );
                AccessDecision::deny(
                    Some(policy_name.clone()),
                    DenialReason::PolicyPanicked {
                        policy: policy_name,
                    },
                )
            }
        }
    }
}
