//! Configuration management for the authorization core
//!
//! This module handles loading, validation, and merging of configuration.

pub mod models;

pub use models::*;

use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix
const ENV_PREFIX: &str = "HYBRID_AUTHZ";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthzError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AuthzError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables (and a `.env` file when present)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Some(algorithm) = env_var("TOKEN_ALGORITHM") {
            config.auth.algorithm = algorithm;
        }
        if let Some(secret) = env_var("TOKEN_SECRET") {
            config.auth.secret = Some(secret);
        }
        if let Some(path) = env_var("PUBLIC_KEY_PATH") {
            config.auth.public_key_path = Some(path);
        }
        if let Some(path) = env_var("PRIVATE_KEY_PATH") {
            config.auth.private_key_path = Some(path);
        }
        if let Some(ttl) = env_var("PROFILE_TTL_SECS") {
            config.cache.profile_ttl_secs = parse_env("PROFILE_TTL_SECS", &ttl)?;
        }
        if let Some(timeout) = env_var("READ_TIMEOUT_MS") {
            config.cache.read_timeout_ms = parse_env("READ_TIMEOUT_MS", &timeout)?;
        }
        if let Some(url) = env_var("DATABASE_URL") {
            config.storage.database.url = url;
        }
        if let Some(url) = env_var("REDIS_URL") {
            config.storage.redis.url = url;
        }
        if let Some(level) = env_var("LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.auth
            .validate()
            .map_err(|e| AuthzError::config(format!("Auth config error: {}", e)))?;

        self.cache
            .validate()
            .map_err(|e| AuthzError::config(format!("Cache config error: {}", e)))?;

        self.filter
            .validate()
            .map_err(|e| AuthzError::config(format!("Filter config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.auth = self.auth.merge(other.auth);
        self.cache = self.cache.merge(other.cache);
        self.filter = self.filter.merge(other.filter);
        self.storage = self.storage.merge(other.storage);
        self.logging = self.logging.merge(other.logging);
        self
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AuthzError::config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AuthzError::config(format!("{}_{} has an invalid value", ENV_PREFIX, name)))
}
