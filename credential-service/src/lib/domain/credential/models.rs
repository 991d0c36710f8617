use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::credential::errors::IdError;
use crate::credential::errors::ValidationError;

/// Registered identity.
///
/// Never hard-deleted; deactivation flips `is_active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub auth_method: AuthMethod,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| IdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Refresh token identifier, carried in the token's `jti` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenId(pub Uuid);

impl RefreshTokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s)
            .map(RefreshTokenId)
            .map_err(|e| IdError::InvalidFormat(e.to_string()))
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using an RFC 5322 compliant parser. Stored as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 254;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidEmail` - Too long or not a syntactically valid address
    pub fn new(email: String) -> Result<Self, ValidationError> {
        if email.len() > Self::MAX_LENGTH {
            return Err(ValidationError::InvalidEmail);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|_| ValidationError::InvalidEmail)
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authentication method tag stored on the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    EmailPassword,
    Other(String),
}

impl AuthMethod {
    const EMAIL_PASSWORD: &'static str = "emailpassword";

    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::EmailPassword => Self::EMAIL_PASSWORD,
            AuthMethod::Other(tag) => tag,
        }
    }
}

impl From<&str> for AuthMethod {
    fn from(tag: &str) -> Self {
        if tag == Self::EMAIL_PASSWORD {
            AuthMethod::EmailPassword
        } else {
            AuthMethod::Other(tag.to_string())
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password credential, one-to-one with a password-based account.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub credential_id: Uuid,
    pub account_id: AccountId,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("credential_id", &self.credential_id)
            .field("account_id", &self.account_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Persisted refresh credential.
///
/// Only `revoked` and `last_used` change after insert.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshCredential {
    pub token_id: RefreshTokenId,
    pub account_id: AccountId,
    pub token: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl fmt::Debug for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCredential")
            .field("token_id", &self.token_id)
            .field("account_id", &self.account_id)
            .field("revoked", &self.revoked)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("last_used", &self.last_used)
            .finish_non_exhaustive()
    }
}

/// Rows written atomically at signup.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account: Account,
    pub password: PasswordCredential,
    pub refresh_token: RefreshCredential,
}

/// Active account looked up for login, with its password credential if any.
#[derive(Debug, Clone)]
pub struct AccountWithPassword {
    pub account: Account,
    pub password: Option<PasswordCredential>,
}

/// Command to register a new account with email and password
#[derive(Clone)]
pub struct SignupCommand {
    pub email: String,
    pub password: String,
}

/// Command to authenticate with email and password
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Command to exchange a refresh token for a new access token
#[derive(Clone)]
pub struct RefreshCommand {
    pub refresh_token: String,
}

impl SignupCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl LoginCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl RefreshCommand {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for SignupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for RefreshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCommand").finish_non_exhaustive()
    }
}

/// Token pair returned by signup and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub account_id: AccountId,
    pub access_token: String,
    pub refresh_token: String,
}

/// Access token returned by a refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
}
