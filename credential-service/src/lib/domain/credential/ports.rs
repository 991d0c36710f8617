use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::CredentialError;
use crate::credential::models::Account;
use crate::credential::models::AccountId;
use crate::credential::models::AccountWithPassword;
use crate::credential::models::EmailAddress;
use crate::credential::models::IssuedTokens;
use crate::credential::models::LoginCommand;
use crate::credential::models::NewAccount;
use crate::credential::models::RefreshCommand;
use crate::credential::models::RefreshCredential;
use crate::credential::models::RefreshTokenId;
use crate::credential::models::RefreshedToken;
use crate::credential::models::SignupCommand;
use crate::domain::deadline::Deadline;

/// Port for credential domain service operations.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new password-based account and open its first session.
    ///
    /// # Arguments
    /// * `command` - Raw email and password
    /// * `deadline` - Bound on every store round-trip of this operation
    ///
    /// # Returns
    /// Access and refresh tokens for the new account
    ///
    /// # Errors
    /// * `Validation` - Missing fields, malformed email, password outside length bounds
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DeadlineExceeded` - Deadline elapsed; nothing was persisted
    /// * `DatabaseError` / `Password` / `TokenSigning` - Internal failure
    async fn signup(
        &self,
        command: SignupCommand,
        deadline: Deadline,
    ) -> Result<IssuedTokens, CredentialError>;

    /// Authenticate with email and password and open a new session.
    ///
    /// # Returns
    /// Fresh access and refresh tokens
    ///
    /// # Errors
    /// * `Validation` - Missing fields
    /// * `InvalidCredentials` - Unknown account, wrong auth method or wrong password
    /// * `DeadlineExceeded` / `DatabaseError` / `Password` / `TokenSigning` - Internal failure
    async fn login(
        &self,
        command: LoginCommand,
        deadline: Deadline,
    ) -> Result<IssuedTokens, CredentialError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token is not rotated.
    ///
    /// # Errors
    /// * `Validation` - Missing token
    /// * `InvalidOrExpiredToken` - Token invalid, expired, unknown or revoked
    /// * `DeadlineExceeded` / `DatabaseError` / `TokenSigning` - Internal failure
    async fn refresh(
        &self,
        command: RefreshCommand,
        deadline: Deadline,
    ) -> Result<RefreshedToken, CredentialError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Check whether an active account already uses this email.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, CredentialError>;

    /// Insert account, password credential and refresh credential in one transaction.
    ///
    /// All three rows exist afterwards or none do.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Unique email constraint rejected the account
    /// * `TokenIdConflict` - Refresh token id already stored
    /// * `DatabaseError` - Database operation failed
    async fn create_with_credentials(&self, new_account: NewAccount)
        -> Result<Account, CredentialError>;

    /// Retrieve an active account and its password credential by email.
    ///
    /// # Returns
    /// None if no active account uses this email
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountWithPassword>, CredentialError>;

    /// Retrieve an account by identifier, active or not.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, CredentialError>;

    /// Replace the password hash and salt of an account.
    ///
    /// # Errors
    /// * `AccountNotFound` - No password credential for this account
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &[u8],
        password_salt: &[u8],
        updated_at: DateTime<Utc>,
    ) -> Result<(), CredentialError>;

    /// Activate or deactivate an account.
    ///
    /// # Errors
    /// * `AccountNotFound` - Account does not exist
    /// * `EmailAlreadyExists` - Reactivation would duplicate an active email
    /// * `DatabaseError` - Database operation failed
    async fn set_active(
        &self,
        id: &AccountId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), CredentialError>;
}

/// Persistence operations for refresh credentials.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Persist a new refresh credential.
    ///
    /// # Errors
    /// * `TokenIdConflict` - Token id already stored
    /// * `DatabaseError` - Database operation failed
    async fn store(&self, credential: RefreshCredential) -> Result<(), CredentialError>;

    /// Report whether a refresh credential is revoked.
    ///
    /// # Errors
    /// * `RefreshTokenNotFound` - Token id unknown
    /// * `DatabaseError` - Database operation failed
    async fn is_revoked(&self, id: &RefreshTokenId) -> Result<bool, CredentialError>;

    /// Record a successful refresh exchange.
    ///
    /// # Errors
    /// * `RefreshTokenNotFound` - Token id unknown
    /// * `DatabaseError` - Database operation failed
    async fn mark_last_used(
        &self,
        id: &RefreshTokenId,
        used_at: DateTime<Utc>,
    ) -> Result<(), CredentialError>;

    /// Revoke a single refresh credential.
    ///
    /// # Errors
    /// * `RefreshTokenNotFound` - Token id unknown
    /// * `DatabaseError` - Database operation failed
    async fn revoke(&self, id: &RefreshTokenId) -> Result<(), CredentialError>;

    /// Revoke every refresh credential of an account.
    ///
    /// # Returns
    /// Number of credentials newly revoked
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn revoke_all_for_account(&self, account_id: &AccountId)
        -> Result<u64, CredentialError>;

    /// Retrieve a refresh credential by id.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find(&self, id: &RefreshTokenId)
        -> Result<Option<RefreshCredential>, CredentialError>;
}

/// Source of the single instant each operation derives its timestamps from.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
