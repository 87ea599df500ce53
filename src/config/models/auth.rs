//! Token configuration

use super::*;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Token signing / verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWS algorithm name (HS256, HS384, HS512, RS256, ES256, EdDSA)
    #[serde(default = "default_token_algorithm")]
    pub algorithm: String,
    /// Shared secret for HMAC algorithms, never generated
    #[serde(default)]
    pub secret: Option<String>,
    /// PEM public key for asymmetric verification
    #[serde(default)]
    pub public_key_path: Option<String>,
    /// PEM private key, only needed where tokens are issued
    #[serde(default)]
    pub private_key_path: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default)]
    pub leeway_secs: u64,
    /// Lifetime of issued tokens, in seconds
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,
    /// Keep an in-process revocation list
    #[serde(default)]
    pub enable_revocation: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: default_token_algorithm(),
            secret: None,
            public_key_path: None,
            private_key_path: None,
            leeway_secs: 0,
            token_lifetime_secs: default_token_lifetime(),
            enable_revocation: false,
        }
    }
}

impl AuthConfig {
    /// Parsed signing algorithm
    pub fn algorithm(&self) -> Result<Algorithm, String> {
        Algorithm::from_str(&self.algorithm)
            .map_err(|_| format!("Unsupported token algorithm: {}", self.algorithm))
    }

    /// Whether the configured algorithm uses a shared secret
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self.algorithm(),
            Ok(Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
        )
    }

    /// Merge auth configurations
    pub fn merge(mut self, other: Self) -> Self {
        if other.algorithm != default_token_algorithm() {
            self.algorithm = other.algorithm;
        }
        if other.secret.is_some() {
            self.secret = other.secret;
        }
        if other.public_key_path.is_some() {
            self.public_key_path = other.public_key_path;
        }
        if other.private_key_path.is_some() {
            self.private_key_path = other.private_key_path;
        }
        if other.leeway_secs != 0 {
            self.leeway_secs = other.leeway_secs;
        }
        if other.token_lifetime_secs != default_token_lifetime() {
            self.token_lifetime_secs = other.token_lifetime_secs;
        }
        if other.enable_revocation {
            self.enable_revocation = other.enable_revocation;
        }
        self
    }

    /// Validate token configuration
    pub fn validate(&self) -> Result<(), String> {
        self.algorithm()?;

        if self.is_symmetric() {
            let secret = self
                .secret
                .as_deref()
                .ok_or_else(|| "A shared secret is required for HMAC algorithms".to_string())?;

            if secret.len() < 32 {
                return Err("Token secret must be at least 32 characters long".to_string());
            }

            if secret == "your-secret-key" || secret == "change-me" {
                return Err("Token secret must not use default values".to_string());
            }
        } else if self.public_key_path.is_none() {
            return Err(format!(
                "{} requires public_key_path for verification",
                self.algorithm
            ));
        }

        if self.token_lifetime_secs < 60 {
            return Err("Token lifetime should be at least 60 seconds".to_string());
        }

        if self.leeway_secs > 300 {
            return Err("Token leeway should not exceed 5 minutes".to_string());
        }

        Ok(())
    }
}
