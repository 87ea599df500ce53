//! Access decision types

use crate::utils::error::{AuthzError, Result};
use serde::Serialize;
use std::fmt;

/// Why an access check denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// The resource type maps no policy to the action
    NoPolicyForAction { kind: String, action: String },
    /// The mapped policy is not registered
    PolicyNotRegistered { policy: String },
    /// The policy ran and returned false
    Rejected { policy: String },
    /// The policy returned an error
    PolicyFailed { policy: String, error: String },
    /// The policy panicked
    PolicyPanicked { policy: String },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NoPolicyForAction { kind, action } => {
                write!(f, "no policy for action '{}' on '{}'", action, kind)
            }
            DenialReason::PolicyNotRegistered { policy } => {
                write!(f, "policy '{}' is not registered", policy)
            }
            DenialReason::Rejected { policy } => write!(f, "rejected by policy '{}'", policy),
            DenialReason::PolicyFailed { policy, error } => {
                write!(f, "policy '{}' failed: {}", policy, error)
            }
            DenialReason::PolicyPanicked { policy } => write!(f, "policy '{}' panicked", policy),
        }
    }
}

/// Outcome of one access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    /// Policy consulted, when the action mapped to one
    pub policy: Option<String>,
    pub denial: Option<DenialReason>,
}

impl AccessDecision {
    pub fn allow(policy: impl Into<String>) -> Self {
        Self {
            allowed: true,
            policy: Some(policy.into()),
            denial: None,
        }
    }

    pub fn deny(policy: Option<String>, reason: DenialReason) -> Self {
        Self {
            allowed: false,
            policy,
            denial: Some(reason),
        }
    }

    /// `Ok(())` when allowed, `DecisionDenied` otherwise
    pub fn into_result(self) -> Result<()> {
        if self.allowed {
            return Ok(());
        }
        let message = self
            .denial
            .map(|reason| reason.to_string())
            .unwrap_or_else(|| "access denied".to_string());
        Err(AuthzError::denied(message))
    }
}
