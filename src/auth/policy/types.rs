//! Policy type definitions

use crate::core::models::{Authorizable, SubjectAttributes};
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a policy body
///
/// The evaluator treats any failure as a denial.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// Result of running a policy
pub type PolicyOutcome = std::result::Result<bool, PolicyError>;

/// A named policy: `(subject, resource, action) -> allow?`
pub type PolicyFn =
    Arc<dyn Fn(&SubjectAttributes, &dyn Authorizable, &str) -> PolicyOutcome + Send + Sync>;
