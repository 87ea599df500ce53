//! End-to-end tests against live services
//!
//! Ignored by default; they need a reachable Redis named by
//! `HYBRID_AUTHZ_TEST_REDIS_URL`.

pub mod redis_tier;
