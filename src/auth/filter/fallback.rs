//! Full-scan fallback for policies without a translation

use super::predicate::Predicate;
use crate::auth::evaluator::PermissionEvaluator;
use crate::core::models::{Authorizable, SubjectAttributes};
use tracing::warn;

/// Per-row evaluation over a bounded candidate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedScan {
    pub policy: String,
    pub action: String,
    /// Superset pre-filter for the store query
    pub candidates: Predicate,
    /// Upper bound on rows inspected
    pub max_rows: usize,
}

/// Rows a bounded scan admitted
#[derive(Debug)]
pub struct ScanResult<'a, R> {
    pub allowed: Vec<&'a R>,
    pub inspected: usize,
    /// Rows remained beyond `max_rows` and were not inspected
    pub truncated: bool,
}

impl BoundedScan {
    /// Run the object-level check on each candidate row
    pub fn evaluate<'a, R, I>(
        &self,
        evaluator: &PermissionEvaluator,
        subject: &SubjectAttributes,
        rows: I,
    ) -> ScanResult<'a, R>
    where
        R: Authorizable + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut rows = rows.into_iter();
        let mut allowed = Vec::new();
        let mut inspected = 0;

        for row in rows.by_ref().take(self.max_rows) {
            inspected += 1;
            if self.candidates.matches(row) && evaluator.check_access(subject, row, &self.action) {
                allowed.push(row);
            }
        }

        let truncated = rows.next().is_some();
        if truncated {
            warn!(
                "Bounded scan for policy '{}' stopped after {} rows; results are partial",
                self.policy, self.max_rows
            );
        }

        ScanResult {
            allowed,
            inspected,
            truncated,
        }
    }
}
