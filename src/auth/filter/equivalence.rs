//! Audit that collection filters agree with object-level checks

use super::translator::{CollectionFilter, CollectionFilterTranslator};
use crate::auth::evaluator::PermissionEvaluator;
use crate::core::models::{Authorizable, SubjectAttributes};
use serde::Serialize;

/// A subject, resource and action on which the two paths disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceMismatch {
    pub subject_id: String,
    pub kind: String,
    pub resource_id: String,
    pub action: String,
    pub object_allowed: bool,
    pub filter_allowed: bool,
}

/// Compare `check_access` with the collection filter over a fixture grid
///
/// Returns every disagreement; an empty result means the translations are
/// equivalent on the given fixtures.
pub fn audit_equivalence<R: Authorizable>(
    evaluator: &PermissionEvaluator,
    translator: &CollectionFilterTranslator,
    subjects: &[SubjectAttributes],
    resources: &[R],
    actions: &[&str],
) -> Vec<EquivalenceMismatch> {
    let mut mismatches = Vec::new();

    for subject in subjects {
        for action in actions {
            for resource in resources {
                let object_allowed = evaluator.check_access(subject, resource, action);
                let filter_allowed =
                    match translator.filter_predicate(subject, resource.resource_type(), action) {
                        CollectionFilter::Pushdown(predicate) => predicate.matches(resource),
                        CollectionFilter::DenyAll { .. } => false,
                        CollectionFilter::BoundedScan(scan) => {
                            scan.candidates.matches(resource)
                                && evaluator.check_access(subject, resource, action)
                        }
                    };

                if object_allowed != filter_allowed {
                    mismatches.push(EquivalenceMismatch {
                        subject_id: subject.subject_id.clone(),
                        kind: resource.kind().to_string(),
                        resource_id: resource.resource_id().to_string(),
                        action: action.to_string(),
                        object_allowed,
                        filter_allowed,
                    });
                }
            }
        }
    }

    mismatches
}
