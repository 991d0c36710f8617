use async_trait::async_trait;

use crate::migration::errors::MigrationError;
use crate::migration::models::Migration;

/// Store operations the migration runner needs.
#[async_trait]
pub trait SchemaStore: Send + Sync + 'static {
    /// Create the schema-version table if it does not exist.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn ensure_version_table(&self) -> Result<(), MigrationError>;

    /// Highest applied version, 0 for an empty table.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn current_version(&self) -> Result<i64, MigrationError>;

    /// Apply one migration and record its version in a single transaction.
    ///
    /// On failure nothing of the migration remains.
    ///
    /// # Errors
    /// * `Conflict` - Version was recorded by a concurrent runner
    /// * `Failed` - Script or commit failed; transaction rolled back
    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError>;
}
