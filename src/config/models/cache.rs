//! Attribute cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Attribute cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Profile TTL in seconds. Bounds staleness when invalidations are missed.
    #[serde(default = "default_profile_ttl")]
    pub profile_ttl_secs: u64,
    /// Timeout for the shared-tier read and read-through rebuild, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Capacity of the per-process tier
    #[serde(default = "default_local_max_entries")]
    pub local_max_entries: u64,
    /// Prefix for shared-tier keys and the invalidation channel
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl_secs: default_profile_ttl(),
            read_timeout_ms: default_read_timeout_ms(),
            local_max_entries: default_local_max_entries(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl CacheConfig {
    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Redis pub/sub channel carrying invalidation events
    pub fn invalidation_channel(&self) -> String {
        format!("{}:invalidate", self.key_prefix)
    }

    /// Merge cache configurations
    pub fn merge(mut self, other: Self) -> Self {
        if other.profile_ttl_secs != default_profile_ttl() {
            self.profile_ttl_secs = other.profile_ttl_secs;
        }
        if other.read_timeout_ms != default_read_timeout_ms() {
            self.read_timeout_ms = other.read_timeout_ms;
        }
        if other.local_max_entries != default_local_max_entries() {
            self.local_max_entries = other.local_max_entries;
        }
        if other.key_prefix != default_key_prefix() {
            self.key_prefix = other.key_prefix;
        }
        self
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.profile_ttl_secs == 0 {
            return Err("profile_ttl_secs must be greater than 0".to_string());
        }
        if self.profile_ttl_secs > 86_400 {
            return Err("profile_ttl_secs must not exceed one day".to_string());
        }
        if self.profile_ttl_secs > 3_600 {
            warn!(
                "Profile TTL of {}s allows hours of staleness when invalidations are missed",
                self.profile_ttl_secs
            );
        }
        if self.read_timeout_ms == 0 {
            return Err("read_timeout_ms must be greater than 0".to_string());
        }
        if self.local_max_entries == 0 {
            return Err("local_max_entries must be greater than 0".to_string());
        }
        if self.key_prefix.is_empty() || self.key_prefix.contains(char::is_whitespace) {
            return Err("key_prefix must be non-empty and contain no whitespace".to_string());
        }
        Ok(())
    }
}
