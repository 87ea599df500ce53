//! Configuration and manifest files shipped in `config/`

#[cfg(test)]
mod tests {
    use hybrid_authz::auth::authority::ServiceManifest;
    use hybrid_authz::config::{Config, FallbackMode, LogFormat};
    use hybrid_authz::core::models::{AttributeType, AttributeValue};
    use std::path::PathBuf;

    fn shipped(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("config")
            .join(name)
    }

    #[tokio::test]
    async fn test_example_config_loads() {
        let config = Config::from_file(shipped("hybrid-authz.yaml.example"))
            .await
            .unwrap();

        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.cache.profile_ttl_secs, 300);
        assert_eq!(config.cache.invalidation_channel(), "hybrid-authz:invalidate");
        assert_eq!(config.filter.fallback, FallbackMode::DenyAll);
        assert!(config.storage.redis.enabled);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[tokio::test]
    async fn test_example_manifest_loads() {
        let manifest = ServiceManifest::from_file(shipped("docs.manifest.yaml.example"))
            .await
            .unwrap();

        assert_eq!(manifest.service, "docs");
        assert_eq!(manifest.roles.len(), 2);
        assert!(manifest.roles.iter().any(|r| r.name == "admin" && r.is_global));

        let groups = manifest
            .attributes
            .iter()
            .find(|a| a.name == "admin_group_ids")
            .unwrap();
        assert_eq!(groups.attribute_type, AttributeType::List);
        assert_eq!(groups.default, Some(AttributeValue::List(Vec::new())));
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let mut config = Config::default();
        config.auth.secret = Some("round_trip_secret_0123456789abcdefghij".to_string());
        let yaml = config.to_yaml().unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.cache.profile_ttl_secs, config.cache.profile_ttl_secs);
        assert_eq!(parsed.auth.secret, config.auth.secret);
        assert!(parsed.validate().is_ok());
    }
}
