//! # strata-db
//!
//! libSQL persistence for Strata.
//!
//! Stores the planning hierarchy, budgets, plans, reviews and cost reference
//! tables in an embedded libSQL database. Every write goes through a
//! repository method on [`service::StrataService`] that runs the rule engine
//! from `strata-core` first and writes nothing when any rule fails. Derived
//! fields are computed on every read.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle: a libSQL database and its single connection.
pub struct StrataDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl StrataDb {
    /// Open a local database at the given path with foreign keys enforced.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open(path, true).await
    }

    /// Open a local database, choosing whether `PRAGMA foreign_keys` is enabled.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(path: &str, foreign_keys: bool) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Per-connection in SQLite
        let pragma = if foreign_keys {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        conn.execute(pragma, ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let strata_db = Self { db, conn };
        strata_db.run_migrations().await?;
        Ok(strata_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"obj-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::Query("randomblob returned no row".into()))?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> StrataDb {
        StrataDb::open_local(":memory:").await.unwrap()
    }

    async fn table_exists(db: &StrataDb, table: &str) -> bool {
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().is_some()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "organizations",
            "memberships",
            "objectives",
            "programs",
            "initiative_feeds",
            "initiatives",
            "measures",
            "activities",
            "sub_activities",
            "activity_budgets",
            "plans",
            "plan_objectives",
            "plan_objective_weights",
            "plan_reviews",
            "locations",
            "land_transports",
            "air_transports",
            "per_diems",
            "accommodations",
            "participant_costs",
            "session_costs",
            "printing_costs",
            "supervisor_costs",
            "procurement_items",
        ];
        for table in &tables {
            assert!(table_exists(&db, table).await, "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("obj").await.unwrap();
        assert!(id.starts_with("obj-"), "ID should start with 'obj-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in strata_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn initiative_needs_exactly_one_parent() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO objectives (id, title, weight) VALUES ('obj-t1', 'Access', 30)",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO initiatives (id, name, weight) VALUES ('ini-t1', 'Orphan', 5)",
                (),
            )
            .await;
        assert!(result.is_err(), "initiative without parent should be rejected");

        db.conn()
            .execute(
                "INSERT INTO initiatives (id, name, weight, strategic_objective_id) VALUES ('ini-t2', 'Ok', 5, 'obj-t1')",
                (),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_enforced_when_enabled() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO programs (id, name, strategic_objective_id) VALUES ('prg-t1', 'P', 'obj-missing')",
                (),
            )
            .await;
        assert!(result.is_err());

        let lax = StrataDb::open(":memory:", false).await.unwrap();
        lax.conn()
            .execute(
                "INSERT INTO programs (id, name, strategic_objective_id) VALUES ('prg-t1', 'P', 'obj-missing')",
                (),
            )
            .await
            .unwrap();
    }
}
