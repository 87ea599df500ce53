//! Collection filter configuration

use super::*;
use serde::{Deserialize, Serialize};

/// What to do when a policy has no registered filter translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Return an always-false predicate
    #[default]
    DenyAll,
    /// Evaluate a bounded candidate set row by row
    BoundedScan,
}

/// Collection filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub fallback: FallbackMode,
    /// Maximum candidates inspected in bounded-scan mode
    #[serde(default = "default_max_scan_rows")]
    pub max_scan_rows: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackMode::DenyAll,
            max_scan_rows: default_max_scan_rows(),
        }
    }
}

impl FilterConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.fallback != FallbackMode::DenyAll {
            self.fallback = other.fallback;
        }
        if other.max_scan_rows != default_max_scan_rows() {
            self.max_scan_rows = other.max_scan_rows;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fallback == FallbackMode::BoundedScan && self.max_scan_rows == 0 {
            return Err("max_scan_rows must be greater than 0 in bounded_scan mode".to_string());
        }
        Ok(())
    }
}
