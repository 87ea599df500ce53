//! Token helpers: key loading, header parsing, digests

use crate::config::AuthConfig;
use crate::utils::error::{AuthzError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Hex SHA-256 of a raw token; revocation entries never hold the token itself
pub(super) fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub(super) fn algorithm(config: &AuthConfig) -> Result<Algorithm> {
    config.algorithm().map_err(AuthzError::config)
}

fn shared_secret(config: &AuthConfig) -> Result<&[u8]> {
    config
        .secret
        .as_deref()
        .map(str::as_bytes)
        .ok_or_else(|| AuthzError::config("A shared secret is required for HMAC algorithms"))
}

async fn read_pem(path: Option<&str>, what: &str) -> Result<Vec<u8>> {
    let path = path.ok_or_else(|| AuthzError::config(format!("{} path is not configured", what)))?;
    tokio::fs::read(path)
        .await
        .map_err(|e| AuthzError::config(format!("Failed to read {} from {}: {}", what, path, e)))
}

pub(super) async fn decoding_key(config: &AuthConfig, algorithm: Algorithm) -> Result<DecodingKey> {
    let key = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            DecodingKey::from_secret(shared_secret(config)?)
        }
        Algorithm::ES256 | Algorithm::ES384 => {
            DecodingKey::from_ec_pem(&read_pem(config.public_key_path.as_deref(), "public key").await?)?
        }
        Algorithm::EdDSA => {
            DecodingKey::from_ed_pem(&read_pem(config.public_key_path.as_deref(), "public key").await?)?
        }
        _ => DecodingKey::from_rsa_pem(&read_pem(config.public_key_path.as_deref(), "public key").await?)?,
    };
    Ok(key)
}

pub(super) async fn encoding_key(config: &AuthConfig, algorithm: Algorithm) -> Result<EncodingKey> {
    let key = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            EncodingKey::from_secret(shared_secret(config)?)
        }
        Algorithm::ES256 | Algorithm::ES384 => {
            EncodingKey::from_ec_pem(&read_pem(config.private_key_path.as_deref(), "private key").await?)?
        }
        Algorithm::EdDSA => {
            EncodingKey::from_ed_pem(&read_pem(config.private_key_path.as_deref(), "private key").await?)?
        }
        _ => EncodingKey::from_rsa_pem(&read_pem(config.private_key_path.as_deref(), "private key").await?)?,
    };
    Ok(key)
}
