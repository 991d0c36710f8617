use async_trait::async_trait;
use sqlx::Executor;
use sqlx::SqlitePool;

use crate::migration::errors::MigrationError;
use crate::migration::models::Migration;
use crate::migration::ports::SchemaStore;
use crate::outbound::repositories::is_unique_violation;

pub struct SqliteSchemaStore {
    pool: SqlitePool,
}

impl SqliteSchemaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaStore for SqliteSchemaStore {
    async fn ensure_version_table(&self) -> Result<(), MigrationError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY NOT NULL)")
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::Database(e.to_string()))?;

        Ok(())
    }

    async fn current_version(&self) -> Result<i64, MigrationError> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrationError::Database(e.to_string()))
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        let version = migration.version;
        let failed = move |e: sqlx::Error| MigrationError::Failed {
            version,
            reason: e.to_string(),
        };

        // Dropping `tx` without commit rolls the whole migration back.
        let mut tx = self.pool.begin().await.map_err(failed)?;

        // Version row first: the write lock is taken before any DDL runs, and a
        // concurrent runner that already recorded this version wins here.
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    MigrationError::Conflict { version }
                } else {
                    failed(e)
                }
            })?;

        // An unprepared query runs every statement of the script.
        Executor::execute(&mut *tx, migration.script)
            .await
            .map_err(failed)?;

        tx.commit().await.map_err(failed)?;

        Ok(())
    }
}
