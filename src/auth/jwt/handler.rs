//! Token validation

use super::types::{Claims, TokenValidator};
use super::utils::{algorithm, decoding_key, token_digest};
use crate::config::AuthConfig;
use crate::utils::error::{AuthzError, Result, TokenRejection};
use crate::utils::time::SharedClock;
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    // Expiry is checked against the injected clock instead.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = ["exp", "sub"].into_iter().map(String::from).collect();
    validation
}

impl TokenValidator {
    /// Create a validator from configuration
    pub async fn new(config: &AuthConfig, clock: SharedClock) -> Result<Self> {
        let algorithm = algorithm(config)?;
        let decoding_key = decoding_key(config, algorithm).await?;

        info!(
            "Token validator ready ({:?}, leeway {}s, revocation {})",
            algorithm,
            config.leeway_secs,
            if config.enable_revocation { "on" } else { "off" }
        );

        Ok(Self {
            decoding_key,
            validation: validation(algorithm),
            algorithm,
            leeway_secs: i64::try_from(config.leeway_secs).unwrap_or(i64::MAX),
            revoked: config.enable_revocation.then(|| Arc::new(DashMap::new())),
            clock,
        })
    }

    /// HS256 validator over a shared secret, with revocation enabled
    pub fn from_secret(secret: &[u8], clock: SharedClock) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: validation(Algorithm::HS256),
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
            revoked: Some(Arc::new(DashMap::new())),
            clock,
        }
    }

    /// Set the tolerated clock skew on `exp`
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
        self
    }

    /// Verify signature and expiry; returns the subject id
    ///
    /// A token is accepted while `exp + leeway > now`.
    pub fn validate(&self, token: &str) -> Result<String> {
        let claims = self.decode_claims(token)?;

        if self.is_expired(&claims) {
            debug!("Token for {} expired at {}", claims.sub, claims.exp);
            return Err(AuthzError::unauthenticated(TokenRejection::Expired));
        }

        if let Some(revoked) = &self.revoked {
            if revoked.contains_key(&token_digest(token)) {
                warn!("Rejected revoked token for {}", claims.sub);
                return Err(AuthzError::unauthenticated(TokenRejection::Revoked));
            }
        }

        Ok(claims.sub)
    }

    /// Revoke a token until its expiry
    ///
    /// The token must carry a valid signature. Revoking an already expired
    /// token is a no-op.
    pub fn revoke(&self, token: &str) -> Result<()> {
        let Some(revoked) = &self.revoked else {
            return Err(AuthzError::config("Token revocation is not enabled"));
        };
        let claims = self.decode_claims(token)?;
        if self.is_expired(&claims) {
            debug!("Not revoking already expired token for {}", claims.sub);
            return Ok(());
        }
        revoked.insert(token_digest(token), claims.exp);
        info!("Revoked token for {} (expires {})", claims.sub, claims.exp);
        Ok(())
    }

    /// Drop revocation entries whose tokens have expired anyway
    pub fn purge_revoked(&self) -> usize {
        let Some(revoked) = &self.revoked else {
            return 0;
        };
        let now = self.clock.unix_now();
        let before = revoked.len();
        revoked.retain(|_, exp| exp.saturating_add(self.leeway_secs) > now);
        let purged = before.saturating_sub(revoked.len());
        if purged > 0 {
            debug!("Purged {} expired revocation entries", purged);
        }
        purged
    }

    /// Number of tokens currently on the revocation list
    pub fn revoked_count(&self) -> usize {
        self.revoked.as_ref().map(|r| r.len()).unwrap_or(0)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthzError::unauthenticated(TokenRejection::Invalid)
        })?;

        if data.claims.sub.trim().is_empty() {
            debug!("Token rejected: empty subject");
            return Err(AuthzError::unauthenticated(TokenRejection::Invalid));
        }
        Ok(data.claims)
    }

    fn is_expired(&self, claims: &Claims) -> bool {
        claims.exp.saturating_add(self.leeway_secs) <= self.clock.unix_now()
    }
}
