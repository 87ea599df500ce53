//! Permission evaluator

mod decision;
mod engine;

pub use decision::{AccessDecision, DenialReason};
pub use engine::PermissionEvaluator;
