//! Integration tests for hybrid-authz
//!
//! These tests verify the interaction between the authority, the attribute
//! cache, the evaluator and the filter translator against real SQLite.

pub mod authority_store_tests;
pub mod config_tests;
pub mod filter_pushdown_tests;
pub mod scenario_tests;
