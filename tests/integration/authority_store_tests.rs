//! Identity authority over the SQL store
//!
//! Manifests, assignments and profile projection against a migrated
//! in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{BILLING, DOCS, Harness, billing_manifest, docs_manifest};
    use crate::{assert_err, assert_ok};
    use chrono::Duration;
    use hybrid_authz::auth::authority::{AuthorityStore, ServiceManifest};
    use hybrid_authz::core::models::{AttributeType, AttributeValue};
    use hybrid_authz::utils::{AuthzError, Clock};

    #[tokio::test]
    async fn test_registering_a_manifest_twice_keeps_one_role() {
        let h = Harness::sqlite().await;

        let first = assert_ok!(h.authority.register_manifest(&docs_manifest()).await);
        assert!(first.service_created);
        assert_eq!(first.roles_created, vec!["editor", "admin"]);

        let second = assert_ok!(h.authority.register_manifest(&docs_manifest()).await);
        assert!(second.is_noop());

        let roles = h.storage.authority.list_roles(DOCS).await.unwrap();
        assert_eq!(roles.iter().filter(|r| r.name == "editor").count(), 1);
        assert_eq!(roles.len(), 2);
    }

    #[tokio::test]
    async fn test_attribute_type_cannot_be_redefined() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();

        let retyped = ServiceManifest::new(DOCS)
            .role("reviewer", false)
            .attribute("department", AttributeType::Int);
        let err = assert_err!(h.authority.register_manifest(&retyped).await);
        assert!(matches!(err, AuthzError::ManifestConflict(_)));

        // Nothing from the rejected manifest was written
        let roles = h.storage.authority.list_roles(DOCS).await.unwrap();
        assert!(roles.iter().all(|r| r.name != "reviewer"));
        let attributes = h.storage.authority.list_attributes(DOCS).await.unwrap();
        let department = attributes.iter().find(|a| a.name == "department").unwrap();
        assert_eq!(department.attribute_type, AttributeType::String);
    }

    #[tokio::test]
    async fn test_registration_is_additive() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();

        let partial = ServiceManifest::new(DOCS)
            .role("editor", false)
            .role("viewer", false);
        let report = h.authority.register_manifest(&partial).await.unwrap();

        assert_eq!(report.roles_created, vec!["viewer"]);
        assert!(report.roles_updated.is_empty());
        assert_eq!(report.retained, vec!["admin", "admin_group_ids", "department"]);

        let roles = h.storage.authority.list_roles(DOCS).await.unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "editor", "viewer"]);
    }

    #[tokio::test]
    async fn test_profile_projection() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();

        h.authority
            .grant_role("alice", "editor", DOCS, "root", None)
            .await
            .unwrap();
        h.authority
            .set_attribute_str("alice", DOCS, "department", "Eng")
            .await
            .unwrap();

        let alice = h.authority.load_profile("alice", DOCS).await.unwrap();
        assert!(alice.has_role("editor"));
        assert!(!alice.has_role("admin"));
        assert_eq!(alice.attribute_str("department"), Some("Eng"));
        // Declared default applies without an explicit value
        assert_eq!(
            alice.attribute("admin_group_ids"),
            Some(&AttributeValue::List(Vec::new()))
        );

        let stranger = h.authority.load_profile("mallory", DOCS).await.unwrap();
        assert!(stranger.roles.is_empty());
        assert_eq!(stranger.attribute("department"), None);
    }

    #[tokio::test]
    async fn test_expired_role_is_not_projected() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();

        let expires_at = h.clock.now() + Duration::seconds(60);
        h.authority
            .grant_role("carol", "admin", DOCS, "root", Some(expires_at))
            .await
            .unwrap();
        assert!(h.authority.load_profile("carol", DOCS).await.unwrap().has_role("admin"));

        h.clock.advance(Duration::seconds(60));
        assert!(!h.authority.load_profile("carol", DOCS).await.unwrap().has_role("admin"));

        let err = assert_err!(
            h.authority
                .grant_role("carol", "admin", DOCS, "root", Some(h.clock.now()))
                .await
        );
        assert!(matches!(err, AuthzError::Validation(_)));
    }

    #[tokio::test]
    async fn test_undeclared_names_and_wrong_types_are_rejected() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority.register_manifest(&billing_manifest()).await.unwrap();

        let err = assert_err!(h.authority.grant_role("alice", "owner", DOCS, "root", None).await);
        assert!(matches!(err, AuthzError::NotFound(_)));

        let err = assert_err!(h.authority.grant_role("alice", "editor", "wiki", "root", None).await);
        assert!(matches!(err, AuthzError::NotFound(_)));

        let err = assert_err!(
            h.authority
                .set_attribute("alice", DOCS, "admin_group_ids", AttributeValue::Int(3))
                .await
        );
        assert!(matches!(err, AuthzError::Validation(_)));

        let err = assert_err!(
            h.authority
                .set_attribute_str("alice", BILLING, "spending_limit", "lots")
                .await
        );
        assert!(matches!(err, AuthzError::Validation(_)));

        let err = assert_err!(h.authority.grant_role(" ", "editor", DOCS, "root", None).await);
        assert!(matches!(err, AuthzError::Validation(_)));
    }

    #[tokio::test]
    async fn test_revoke_and_clear() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();

        h.authority
            .grant_role("bob", "editor", DOCS, "root", None)
            .await
            .unwrap();
        h.authority
            .set_attribute_str("bob", DOCS, "admin_group_ids", "g1, g3")
            .await
            .unwrap();

        let bob = h.authority.load_profile("bob", DOCS).await.unwrap();
        assert_eq!(
            bob.attribute("admin_group_ids"),
            Some(&AttributeValue::from(vec!["g1", "g3"]))
        );

        assert!(h.authority.revoke_role("bob", "editor", DOCS).await.unwrap());
        assert!(!h.authority.revoke_role("bob", "editor", DOCS).await.unwrap());
        assert!(h.authority.clear_attribute("bob", DOCS, "admin_group_ids").await.unwrap());

        let bob = h.authority.load_profile("bob", DOCS).await.unwrap();
        assert!(bob.roles.is_empty());
        assert_eq!(
            bob.attribute("admin_group_ids"),
            Some(&AttributeValue::List(Vec::new()))
        );
    }

    #[tokio::test]
    async fn test_roles_are_scoped_per_service() {
        let h = Harness::sqlite().await;
        h.authority.register_manifest(&docs_manifest()).await.unwrap();
        h.authority.register_manifest(&billing_manifest()).await.unwrap();

        h.authority
            .grant_role("carol", "admin", BILLING, "root", None)
            .await
            .unwrap();

        assert!(h.authority.load_profile("carol", BILLING).await.unwrap().has_role("admin"));
        assert!(!h.authority.load_profile("carol", DOCS).await.unwrap().has_role("admin"));
        assert_eq!(
            h.authority
                .load_profile("carol", BILLING)
                .await
                .unwrap()
                .attribute("spending_limit"),
            Some(&AttributeValue::Int(0))
        );
    }
}
