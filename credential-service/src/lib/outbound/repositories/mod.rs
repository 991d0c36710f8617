pub mod account;
pub mod refresh_token;

pub use account::SqliteAccountRepository;
pub use refresh_token::SqliteRefreshTokenRepository;

use crate::credential::errors::CredentialError;

/// True when the error is a UNIQUE or PRIMARY KEY constraint failure.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

pub(crate) fn database_error(e: sqlx::Error) -> CredentialError {
    CredentialError::DatabaseError(e.to_string())
}
