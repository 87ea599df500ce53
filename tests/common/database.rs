//! Test database utilities
//!
//! In-memory SQLite with the authority schema migrated. Each call creates an
//! isolated database.

use hybrid_authz::config::DatabaseConfig;
use hybrid_authz::storage::database::Database;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new migrated in-memory database
    pub async fn new() -> Self {
        let db = Database::connect_and_migrate(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to create in-memory test database");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Database with a `documents` table for filter pushdown tests
    pub async fn with_documents(rows: &[DocumentRow]) -> Self {
        let db = Self::new().await;
        db.create_documents(rows).await;
        db
    }

    pub fn db(&self) -> &Database {
        &self.inner
    }

    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }

    async fn create_documents(&self, rows: &[DocumentRow]) {
        let conn = self.inner.connection();
        conn.execute_unprepared(
            "CREATE TABLE documents (
                resource_id TEXT PRIMARY KEY,
                owner_id TEXT,
                group_id TEXT,
                department TEXT
            )",
        )
        .await
        .expect("Failed to create documents table");

        for row in rows {
            let sql = format!(
                "INSERT INTO documents (resource_id, owner_id, group_id, department) VALUES ({}, {}, {}, {})",
                quote(Some(row.id)),
                quote(row.owner),
                quote(row.group),
                quote(row.department)
            );
            conn.execute_unprepared(&sql)
                .await
                .expect("Failed to insert document");
        }
    }
}

/// A row of the `documents` table
#[derive(Debug, Clone, Copy)]
pub struct DocumentRow {
    pub id: &'static str,
    pub owner: Option<&'static str>,
    pub group: Option<&'static str>,
    pub department: Option<&'static str>,
}

fn quote(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = TestDatabase::new().await;
        assert!(db.db().health_check().await.is_ok());
    }
}
