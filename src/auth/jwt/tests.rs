//! Token module tests

#[cfg(test)]
mod tests {
    use crate::auth::jwt::{Claims, TokenIssuer, TokenValidator, extract_bearer};
    use crate::config::AuthConfig;
    use crate::utils::error::{AuthzError, TokenRejection};
    use crate::utils::time::{Clock, ManualClock, SharedClock};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::sync::Arc;

    const SECRET: &[u8] = b"test_secret_key_for_testing_only_0123456789";

    fn setup() -> (Arc<ManualClock>, TokenIssuer, TokenValidator) {
        let clock = Arc::new(ManualClock::starting_now());
        let shared: SharedClock = clock.clone();
        let issuer = TokenIssuer::from_secret(SECRET, 3600, shared.clone());
        let validator = TokenValidator::from_secret(SECRET, shared);
        (clock, issuer, validator)
    }

    fn rejection(err: AuthzError) -> TokenRejection {
        match err {
            AuthzError::Unauthenticated(reason) => reason,
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let (_, issuer, validator) = setup();
        let token = issuer.issue("alice").unwrap();
        assert_eq!(validator.validate(&token).unwrap(), "alice");
    }

    #[test]
    fn test_expiry_boundary() {
        let (clock, issuer, validator) = setup();
        let token = issuer.issue_with_ttl("alice", std::time::Duration::from_secs(60)).unwrap();

        clock.advance(Duration::seconds(59));
        assert!(validator.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        let err = validator.validate(&token).unwrap_err();
        assert_eq!(rejection(err), TokenRejection::Expired);
    }

    #[test]
    fn test_leeway_extends_acceptance() {
        let (clock, issuer, validator) = setup();
        let validator = validator.with_leeway(30);
        let token = issuer.issue_with_ttl("alice", std::time::Duration::from_secs(60)).unwrap();

        clock.advance(Duration::seconds(80));
        assert!(validator.validate(&token).is_ok());
        clock.advance(Duration::seconds(10));
        assert!(validator.validate(&token).is_err());
    }

    #[test]
    fn test_bad_signature_is_invalid() {
        let (clock, _, validator) = setup();
        let other = TokenIssuer::from_secret(b"another_secret_entirely_000000000000", 3600, clock);
        let token = other.issue("alice").unwrap();
        assert_eq!(rejection(validator.validate(&token).unwrap_err()), TokenRejection::Invalid);

        assert_eq!(
            rejection(validator.validate("invalid.jwt.token").unwrap_err()),
            TokenRejection::Invalid
        );
    }

    #[test]
    fn test_missing_or_empty_subject_is_invalid() {
        let (clock, _, validator) = setup();
        let exp = (clock.now() + Duration::hours(1)).timestamp();

        #[derive(serde::Serialize)]
        struct OnlyExp {
            exp: i64,
        }
        let key = EncodingKey::from_secret(SECRET);
        let no_sub = encode(&Header::default(), &OnlyExp { exp }, &key).unwrap();
        assert_eq!(rejection(validator.validate(&no_sub).unwrap_err()), TokenRejection::Invalid);

        let empty_sub = encode(
            &Header::default(),
            &Claims {
                sub: String::new(),
                exp,
            },
            &key,
        )
        .unwrap();
        assert_eq!(
            rejection(validator.validate(&empty_sub).unwrap_err()),
            TokenRejection::Invalid
        );
    }

    #[test]
    fn test_extra_claims_are_ignored() {
        let (clock, _, validator) = setup();
        let exp = (clock.now() + Duration::hours(1)).timestamp();
        let claims = serde_json::json!({
            "sub": "bob",
            "exp": exp,
            "role": "admin",
            "department": "Eng",
        });
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert_eq!(validator.validate(&token).unwrap(), "bob");
    }

    #[test]
    fn test_revocation() {
        let (clock, issuer, validator) = setup();
        let token = issuer.issue_with_ttl("alice", std::time::Duration::from_secs(120)).unwrap();
        let other = issuer.issue("alice").unwrap();

        validator.revoke(&token).unwrap();
        assert_eq!(rejection(validator.validate(&token).unwrap_err()), TokenRejection::Revoked);
        assert!(validator.validate(&other).is_ok());
        assert_eq!(validator.revoked_count(), 1);

        // Once expired the token reports Expired and the entry can go
        clock.advance(Duration::seconds(120));
        assert_eq!(rejection(validator.validate(&token).unwrap_err()), TokenRejection::Expired);
        assert_eq!(validator.purge_revoked(), 1);
        assert_eq!(validator.revoked_count(), 0);
    }

    #[tokio::test]
    async fn test_validator_from_config() {
        let clock: SharedClock = Arc::new(ManualClock::starting_now());
        let config = AuthConfig {
            secret: Some(String::from_utf8(SECRET.to_vec()).unwrap()),
            ..AuthConfig::default()
        };
        let validator = TokenValidator::new(&config, clock.clone()).await.unwrap();
        let issuer = TokenIssuer::new(&config, clock).await.unwrap();
        assert_eq!(issuer.lifetime_secs(), 3600);

        let token = issuer.issue("carol").unwrap();
        assert_eq!(validator.validate(&token).unwrap(), "carol");
        assert!(matches!(validator.revoke(&token), Err(AuthzError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_public_key_is_config_error() {
        let clock: SharedClock = Arc::new(ManualClock::starting_now());
        let config = AuthConfig {
            algorithm: "RS256".to_string(),
            public_key_path: Some("/nonexistent/key.pem".to_string()),
            ..AuthConfig::default()
        };
        let err = TokenValidator::new(&config, clock).await.unwrap_err();
        assert!(matches!(err, AuthzError::Config(_)));
    }

    #[test]
    fn test_issue_rejects_empty_subject() {
        let (_, issuer, _) = setup();
        assert!(matches!(issuer.issue(" "), Err(AuthzError::Validation(_))));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("bearer  abc "), Some("abc"));
        assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer(""), None);
    }
}
