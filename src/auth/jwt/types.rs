//! Token types

use crate::utils::time::SharedClock;
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Token claims
///
/// Only the subject and expiry are read. Any other claim in a token is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id
    pub sub: String,
    /// Expiration, unix seconds
    pub exp: i64,
}

/// Verifies bearer tokens and extracts the subject id
#[derive(Clone)]
pub struct TokenValidator {
    pub(super) decoding_key: DecodingKey,
    pub(super) validation: Validation,
    pub(super) algorithm: Algorithm,
    /// Clock skew tolerated on `exp`, in seconds
    pub(super) leeway_secs: i64,
    /// SHA-256 digest of revoked tokens, mapped to their expiry
    pub(super) revoked: Option<Arc<DashMap<String, i64>>>,
    pub(super) clock: SharedClock,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .field("revocation", &self.revoked.is_some())
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Signs `{sub, exp}` tokens on the identity authority side
#[derive(Clone)]
pub struct TokenIssuer {
    pub(super) encoding_key: EncodingKey,
    pub(super) algorithm: Algorithm,
    /// Token lifetime in seconds
    pub(super) lifetime_secs: u64,
    pub(super) clock: SharedClock,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("lifetime_secs", &self.lifetime_secs)
            .field("encoding_key", &"[REDACTED]")
            .finish()
    }
}
