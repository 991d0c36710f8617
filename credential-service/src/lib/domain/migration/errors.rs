use thiserror::Error;

use crate::domain::deadline::DeadlineExceeded;

/// Error for schema migration operations. Any of these is fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("Migration versions must be positive and strictly increasing: {0}")]
    InvalidSequence(String),

    #[error("Recorded schema version {recorded} is newer than latest known migration {latest}")]
    UnknownVersion { recorded: i64, latest: i64 },

    #[error("Migration {version} was applied concurrently by another process")]
    Conflict { version: i64 },

    #[error("Migration {version} failed: {reason}")]
    Failed { version: i64, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl From<DeadlineExceeded> for MigrationError {
    fn from(_: DeadlineExceeded) -> Self {
        MigrationError::DeadlineExceeded
    }
}
