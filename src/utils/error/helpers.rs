//! Helper functions for creating and classifying errors

use super::types::{AuthzError, TokenRejection};

/// Helper functions for creating specific errors
impl AuthzError {
    pub fn unauthenticated(reason: TokenRejection) -> Self {
        Self::Unauthenticated(reason)
    }

    pub fn denied<S: Into<String>>(message: S) -> Self {
        Self::DecisionDenied(message.into())
    }

    pub fn cache_unavailable<S: Into<String>>(message: S) -> Self {
        Self::CacheUnavailable(message.into())
    }

    pub fn manifest_conflict<S: Into<String>>(message: S) -> Self {
        Self::ManifestConflict(message.into())
    }

    pub fn policy_not_found<S: Into<String>>(name: S) -> Self {
        Self::PolicyNotFound(name.into())
    }

    pub fn duplicate<S: Into<String>>(message: S) -> Self {
        Self::DuplicateArgument(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl AuthzError {
    /// HTTP-equivalent status code for callers that front the core with an API
    pub fn status_code(&self) -> u16 {
        match self {
            AuthzError::Unauthenticated(_) => 401,
            AuthzError::DecisionDenied(_) => 403,
            AuthzError::NotFound(_) | AuthzError::PolicyNotFound(_) => 404,
            AuthzError::ManifestConflict(_) | AuthzError::DuplicateArgument(_) => 409,
            AuthzError::Validation(_) => 422,
            AuthzError::CacheUnavailable(_) => 503,
            AuthzError::Timeout(_) => 504,
            _ => 500,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated(_) => "UNAUTHENTICATED",
            AuthzError::DecisionDenied(_) => "DECISION_DENIED",
            AuthzError::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            AuthzError::ManifestConflict(_) => "MANIFEST_CONFLICT",
            AuthzError::PolicyNotFound(_) => "POLICY_NOT_FOUND",
            AuthzError::DuplicateArgument(_) => "DUPLICATE_ARGUMENT",
            AuthzError::Config(_) => "CONFIG_ERROR",
            AuthzError::Validation(_) => "VALIDATION_ERROR",
            AuthzError::NotFound(_) => "NOT_FOUND",
            #[cfg(feature = "redis")]
            AuthzError::Redis(_) => "CACHE_ERROR",
            AuthzError::Database(_) => "DATABASE_ERROR",
            AuthzError::Serialization(_) | AuthzError::Yaml(_) => "SERIALIZATION_ERROR",
            AuthzError::Io(_) => "IO_ERROR",
            AuthzError::Jwt(_) => "TOKEN_ERROR",
            AuthzError::Timeout(_) => "TIMEOUT",
            AuthzError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying with backoff can succeed
    pub fn is_transient(&self) -> bool {
        match self {
            AuthzError::CacheUnavailable(_) | AuthzError::Timeout(_) => true,
            #[cfg(feature = "redis")]
            AuthzError::Redis(e) => e.is_io_error() || e.is_timeout() || e.is_connection_dropped(),
            _ => false,
        }
    }

    /// Configuration problems surface at startup or first use and never allow access
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AuthzError::Config(_)
                | AuthzError::ManifestConflict(_)
                | AuthzError::PolicyNotFound(_)
                | AuthzError::DuplicateArgument(_)
        )
    }
}
