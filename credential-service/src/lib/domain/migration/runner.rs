use std::sync::Arc;

use crate::domain::deadline::Deadline;
use crate::migration::errors::MigrationError;
use crate::migration::models::Migration;
use crate::migration::models::MigrationReport;
use crate::migration::ports::SchemaStore;

/// Embedded schema-evolution runner.
///
/// Brings a store from its recorded version to the latest known migration,
/// one transaction per migration. Safe to run on every process start.
pub struct Migrator<S>
where
    S: SchemaStore,
{
    store: Arc<S>,
    migrations: Vec<Migration>,
}

impl<S> Migrator<S>
where
    S: SchemaStore,
{
    /// Create a runner over an ordered migration list.
    ///
    /// # Arguments
    /// * `store` - Schema store to migrate
    /// * `migrations` - Migrations in ascending version order
    ///
    /// # Errors
    /// * `InvalidSequence` - A version is not positive or not strictly increasing
    pub fn new(store: Arc<S>, migrations: &[Migration]) -> Result<Self, MigrationError> {
        let mut previous = 0;
        for migration in migrations {
            if migration.version <= previous {
                return Err(MigrationError::InvalidSequence(format!(
                    "version {} follows {}",
                    migration.version, previous
                )));
            }
            previous = migration.version;
        }

        Ok(Self {
            store,
            migrations: migrations.to_vec(),
        })
    }

    /// Latest version known to this binary, 0 when the list is empty.
    pub fn latest_version(&self) -> i64 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    /// Apply every migration newer than the recorded version.
    ///
    /// Stops at the first failure; the store then sits at the last
    /// successfully committed version.
    ///
    /// # Arguments
    /// * `deadline` - Bound on each store round-trip
    ///
    /// # Returns
    /// Report of the versions before and after the run
    ///
    /// # Errors
    /// * `UnknownVersion` - Store is ahead of this binary
    /// * `Conflict` - A concurrent runner applied the same migration first
    /// * `Failed` / `Database` / `DeadlineExceeded` - Migration could not be applied
    pub async fn run(&self, deadline: Deadline) -> Result<MigrationReport, MigrationError> {
        deadline.run(self.store.ensure_version_table()).await?;

        let from = deadline.run(self.store.current_version()).await?;
        let latest = self.latest_version();

        if from > latest {
            return Err(MigrationError::UnknownVersion {
                recorded: from,
                latest,
            });
        }

        tracing::info!(current = from, latest, "Checking schema version");

        let mut applied = Vec::new();
        for migration in self.migrations.iter().filter(|m| m.version > from) {
            tracing::info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            if let Err(e) = deadline.run(self.store.apply(migration)).await {
                tracing::error!("Migration {} failed: {}", migration.version, e);
                return Err(e);
            }

            applied.push(migration.version);
        }

        let to = applied.last().copied().unwrap_or(from);
        if applied.is_empty() {
            tracing::info!(version = to, "Schema up to date");
        } else {
            tracing::info!(from, to, "Schema migrated");
        }

        Ok(MigrationReport { from, to, applied })
    }
}
