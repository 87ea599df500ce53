//! Error types for the authorization core

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for the authorization core
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Why a bearer token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// Malformed token, bad signature or missing claims
    Invalid,
    /// Signature is valid but `exp` is not in the future
    Expired,
    /// Token was explicitly revoked before its expiry
    Revoked,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenRejection::Invalid => "invalid token",
            TokenRejection::Expired => "token expired",
            TokenRejection::Revoked => "token revoked",
        };
        f.write_str(s)
    }
}

/// Main error type for the authorization core
#[derive(Error, Debug)]
pub enum AuthzError {
    /// Bad, expired or revoked token. Authentication failure, not authorization.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(TokenRejection),

    /// The expected "no" answer of an authorization check
    #[error("Access denied: {0}")]
    DecisionDenied(String),

    /// Attribute cache or its read-through path could not answer in time
    #[error("Attribute cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A manifest tried to redefine an existing attribute incompatibly
    #[error("Manifest conflict: {0}")]
    ManifestConflict(String),

    /// A resource maps an action to a policy that was never registered
    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    /// A name was registered twice
    #[error("Duplicate argument: {0}")]
    DuplicateArgument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JWT encoding errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
