//! Token issuing

use super::types::{Claims, TokenIssuer};
use super::utils::{algorithm, encoding_key};
use crate::config::AuthConfig;
use crate::utils::error::{AuthzError, Result};
use crate::utils::time::SharedClock;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::Duration;
use tracing::debug;

impl TokenIssuer {
    /// Create an issuer from configuration
    pub async fn new(config: &AuthConfig, clock: SharedClock) -> Result<Self> {
        let algorithm = algorithm(config)?;
        Ok(Self {
            encoding_key: encoding_key(config, algorithm).await?,
            algorithm,
            lifetime_secs: config.token_lifetime_secs,
            clock,
        })
    }

    /// HS256 issuer over a shared secret
    pub fn from_secret(secret: &[u8], lifetime_secs: u64, clock: SharedClock) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetime_secs,
            clock,
        }
    }

    /// Issue a token with the configured lifetime
    pub fn issue(&self, subject_id: &str) -> Result<String> {
        self.issue_with_ttl(subject_id, Duration::from_secs(self.lifetime_secs))
    }

    /// Issue a token that expires `ttl` from now
    pub fn issue_with_ttl(&self, subject_id: &str, ttl: Duration) -> Result<String> {
        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthzError::validation("token lifetime is too large"))?;
        let exp = self.clock.unix_now().saturating_add(ttl);
        self.sign(subject_id, exp)
    }

    /// Issue a token with an absolute expiry
    pub fn issue_until(&self, subject_id: &str, expires_at: DateTime<Utc>) -> Result<String> {
        self.sign(subject_id, expires_at.timestamp())
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    fn sign(&self, subject_id: &str, exp: i64) -> Result<String> {
        if subject_id.trim().is_empty() {
            return Err(AuthzError::validation("subject id cannot be empty"));
        }
        let claims = Claims {
            sub: subject_id.to_string(),
            exp,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        debug!("Issued token for {} expiring at {}", subject_id, exp);
        Ok(token)
    }
}
