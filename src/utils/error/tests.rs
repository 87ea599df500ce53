//! Tests for error handling

#[cfg(test)]
mod tests {
    use super::super::types::{AuthzError, TokenRejection};

    #[test]
    fn test_authentication_and_authorization_are_distinct() {
        let authn = AuthzError::unauthenticated(TokenRejection::Expired);
        let authz = AuthzError::denied("missing role");

        assert_eq!(authn.status_code(), 401);
        assert_eq!(authz.status_code(), 403);
        assert_ne!(authn.error_code(), authz.error_code());
    }

    #[test]
    fn test_token_rejection_display() {
        let error = AuthzError::unauthenticated(TokenRejection::Revoked);
        assert_eq!(error.to_string(), "Unauthenticated: token revoked");
    }

    #[test]
    fn test_cache_unavailable_is_transient() {
        assert!(AuthzError::cache_unavailable("redis down").is_transient());
        assert!(AuthzError::timeout("read-through").is_transient());
        assert!(!AuthzError::manifest_conflict("type changed").is_transient());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(AuthzError::policy_not_found("ownerOnly").is_configuration());
        assert!(AuthzError::duplicate("ownerOnly").is_configuration());
        assert!(AuthzError::manifest_conflict("docs.department").is_configuration());
        assert!(!AuthzError::denied("nope").is_configuration());
    }

    #[test]
    fn test_manifest_conflict_status() {
        let error = AuthzError::manifest_conflict("attribute 'department' changed type");
        assert_eq!(error.status_code(), 409);
        assert_eq!(error.error_code(), "MANIFEST_CONFLICT");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let error: AuthzError = parse.unwrap_err().into();
        assert!(matches!(error, AuthzError::Serialization(_)));
        assert_eq!(error.status_code(), 500);
    }
}
