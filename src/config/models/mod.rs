//! Configuration data models
//!
//! This module defines all configuration structures used by the authorization core.

pub mod auth;
pub mod cache;
pub mod filter;
pub mod logging;
pub mod storage;

// Re-export all configuration types
pub use auth::*;
pub use cache::*;
pub use filter::*;
pub use logging::*;
pub use storage::*;

pub fn default_token_algorithm() -> String {
    "HS256".to_string()
}

pub fn default_token_lifetime() -> u64 {
    3600 // 1 hour
}

pub fn default_profile_ttl() -> u64 {
    300 // 5 minutes
}

pub fn default_read_timeout_ms() -> u64 {
    500
}

pub fn default_local_max_entries() -> u64 {
    10_000
}

pub fn default_key_prefix() -> String {
    "hybrid-authz".to_string()
}

pub fn default_max_scan_rows() -> usize {
    500
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_database_url() -> String {
    "sqlite://hybrid-authz.db?mode=rwc".to_string()
}

pub fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
