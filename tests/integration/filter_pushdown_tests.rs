//! Collection filters compiled to SQL
//!
//! Runs translated predicates against a SQLite table and checks the rows
//! returned are exactly the rows the object-level check allows.

#[cfg(test)]
mod tests {
    use crate::common::database::{DocumentRow, TestDatabase};
    use crate::common::fixtures::{DOCS, Harness, document};
    use hybrid_authz::auth::filter::{CollectionFilter, PredicateCompiler, audit_equivalence};
    use hybrid_authz::auth::Predicate;
    use hybrid_authz::core::models::{Authorizable, ResourceRecord, SubjectAttributes};
    use hybrid_authz::storage::database::SeaQueryCompiler;
    use hybrid_authz::utils::AuthzError;
    use sea_orm::sea_query::{Alias, Expr, Order, Query, SqliteQueryBuilder};
    use sea_orm::{ConnectionTrait, DbBackend};

    const ROWS: &[DocumentRow] = &[
        DocumentRow {
            id: "d1",
            owner: Some("alice"),
            group: Some("g1"),
            department: Some("Eng"),
        },
        DocumentRow {
            id: "d2",
            owner: Some("bob"),
            group: Some("g2"),
            department: Some("Sales"),
        },
        DocumentRow {
            id: "d3",
            owner: Some("carol"),
            group: Some("g3"),
            department: Some("Eng"),
        },
        DocumentRow {
            id: "d4",
            owner: Some("dave"),
            group: None,
            department: None,
        },
        DocumentRow {
            id: "d5",
            owner: None,
            group: Some("g1"),
            department: Some("Sales"),
        },
    ];

    fn records() -> Vec<ResourceRecord> {
        ROWS.iter()
            .map(|row| {
                let mut record = document(row.id);
                if let Some(owner) = row.owner {
                    record = record.owned_by(owner);
                }
                if let Some(group) = row.group {
                    record = record.in_group(group);
                }
                if let Some(department) = row.department {
                    record = record.with_field("department", department);
                }
                record
            })
            .collect()
    }

    fn subjects() -> Vec<SubjectAttributes> {
        vec![
            SubjectAttributes::new("alice", DOCS)
                .with_role("editor")
                .with_attribute("department", "Eng"),
            SubjectAttributes::new("bob", DOCS)
                .with_attribute("admin_group_ids", vec!["g1", "g3"]),
            SubjectAttributes::new("carol", DOCS)
                .with_role("admin")
                .with_attribute("department", "Sales")
                .with_attribute("admin_group_ids", Vec::<String>::new()),
            SubjectAttributes::empty("dave", DOCS),
        ]
    }

    const ACTIONS: &[&str] = &["view", "edit", "own", "purge", "read", "share"];

    async fn select_ids(db: &TestDatabase, predicate: &Predicate) -> Vec<String> {
        let condition = SeaQueryCompiler::new().compile(predicate).unwrap();
        let query = Query::select()
            .column(Alias::new("resource_id"))
            .from(Alias::new("documents"))
            .cond_where(condition)
            .order_by(Alias::new("resource_id"), Order::Asc)
            .to_owned();

        let rows = db
            .db()
            .connection()
            .query_all(DbBackend::Sqlite.build(&query))
            .await
            .unwrap();
        rows.iter()
            .map(|row| row.try_get::<String>("", "resource_id").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_sql_rows_match_object_level_checks() {
        let h = Harness::in_memory().await;
        let db = TestDatabase::with_documents(ROWS).await;
        let records = records();
        let resource_type = records[0].resource_type().clone();

        for subject in subjects() {
            for action in ACTIONS {
                let filter = h.translator.filter_predicate(&subject, &resource_type, action);
                let from_sql = select_ids(&db, &filter.query_predicate()).await;

                let allowed: Vec<String> = records
                    .iter()
                    .filter(|r| h.evaluator.check_access(&subject, *r, action))
                    .map(|r| r.resource_id().to_string())
                    .collect();

                assert_eq!(
                    from_sql, allowed,
                    "{} {} via {}",
                    subject.subject_id,
                    action,
                    filter.query_predicate()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_group_admin_sql_filter() {
        let h = Harness::in_memory().await;
        let db = TestDatabase::with_documents(ROWS).await;
        let subjects = subjects();
        let bob = &subjects[1];

        let filter = h.translator.filter_predicate(bob, &document("x").resource_type().clone(), "view");
        assert!(matches!(filter, CollectionFilter::Pushdown(_)));
        assert_eq!(select_ids(&db, &filter.query_predicate()).await, vec!["d1", "d2", "d3", "d5"]);

        // No admin groups: owner clause only
        let carol = &subjects[2];
        let filter = h.translator.filter_predicate(carol, &document("x").resource_type().clone(), "view");
        assert_eq!(filter.query_predicate(), Predicate::equals("owner_id", "carol"));
        assert_eq!(select_ids(&db, &filter.query_predicate()).await, vec!["d3"]);
    }

    #[tokio::test]
    async fn test_deny_all_selects_nothing() {
        let h = Harness::in_memory().await;
        let db = TestDatabase::with_documents(ROWS).await;
        let subjects = subjects();
        let dave = &subjects[3];

        let filter = h.translator.filter_predicate(dave, &document("x").resource_type().clone(), "edit");
        assert!(filter.is_empty());
        assert!(select_ids(&db, &filter.query_predicate()).await.is_empty());

        // Unmapped action
        let filter = h.translator.filter_predicate(dave, &document("x").resource_type().clone(), "share");
        assert!(select_ids(&db, &filter.query_predicate()).await.is_empty());
    }

    #[tokio::test]
    async fn test_audit_finds_no_mismatch_for_builtins() {
        let h = Harness::in_memory().await;
        let mismatches =
            audit_equivalence(&h.evaluator, &h.translator, &subjects(), &records(), ACTIONS);
        assert!(mismatches.is_empty(), "{:?}", mismatches);
    }

    #[test]
    fn test_qualified_and_remapped_columns() {
        let compiler = SeaQueryCompiler::for_table("documents").column("owner_id", "created_by");
        let condition = compiler
            .compile(&Predicate::or(vec![
                Predicate::equals("owner_id", "bob"),
                Predicate::one_of("group_id", vec!["g1", "g3"]),
            ]))
            .unwrap();
        let (sql, _) = Query::select()
            .expr(Expr::val(1))
            .from(Alias::new("documents"))
            .cond_where(condition)
            .build(SqliteQueryBuilder);

        assert!(sql.contains(r#""documents"."created_by""#), "{}", sql);
        assert!(sql.contains(r#""documents"."group_id" IN"#), "{}", sql);
        assert!(sql.contains(" OR "), "{}", sql);
    }

    #[test]
    fn test_list_value_cannot_be_compared_in_sql() {
        let predicate = Predicate::equals("tags", vec!["a", "b"]);
        let err = SeaQueryCompiler::new().compile(&predicate).unwrap_err();
        assert!(matches!(err, AuthzError::Validation(_)));
    }
}
