use auth::PasswordError;
use thiserror::Error;

use crate::domain::deadline::DeadlineExceeded;

/// Error for AccountId / RefreshTokenId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Input rejected before any work is done; surfaced to the caller verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields")]
    MissingFields,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password is too short: minimum {min} characters")]
    PasswordTooShort { min: usize },

    #[error("password is too long: maximum {max} characters")]
    PasswordTooLong { max: usize },
}

/// Coarse error taxonomy seen by callers of the credential service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input
    Validation,
    /// Email already registered
    Conflict,
    /// Bad credentials or invalid/expired/revoked token, cause not disclosed
    Authentication,
    /// Store, hashing, signing or deadline failure
    Internal,
}

/// Top-level error for all credential operations
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Refresh token is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Refresh token id already exists")]
    TokenIdConflict,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl CredentialError {
    /// Taxonomy bucket used to pick the outward response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::Validation(_) => ErrorKind::Validation,
            CredentialError::EmailAlreadyExists(_) => ErrorKind::Conflict,
            CredentialError::InvalidCredentials | CredentialError::InvalidOrExpiredToken => {
                ErrorKind::Authentication
            }
            CredentialError::AccountNotFound
            | CredentialError::RefreshTokenNotFound
            | CredentialError::Password(_)
            | CredentialError::TokenSigning(_)
            | CredentialError::TokenIdConflict
            | CredentialError::DatabaseError(_)
            | CredentialError::DeadlineExceeded
            | CredentialError::Unknown(_) => ErrorKind::Internal,
        }
    }
}

impl From<DeadlineExceeded> for CredentialError {
    fn from(_: DeadlineExceeded) -> Self {
        CredentialError::DeadlineExceeded
    }
}
