use std::sync::Arc;

use async_trait::async_trait;
use auth::JwtError;
use auth::PasswordHasher;
use auth::TokenIssuer;

use crate::credential::errors::CredentialError;
use crate::credential::errors::ValidationError;
use crate::credential::models::Account;
use crate::credential::models::AccountId;
use crate::credential::models::AuthMethod;
use crate::credential::models::EmailAddress;
use crate::credential::models::IssuedTokens;
use crate::credential::models::LoginCommand;
use crate::credential::models::NewAccount;
use crate::credential::models::PasswordCredential;
use crate::credential::models::RefreshCommand;
use crate::credential::models::RefreshCredential;
use crate::credential::models::RefreshTokenId;
use crate::credential::models::RefreshedToken;
use crate::credential::models::SignupCommand;
use crate::credential::ports::AccountRepository;
use crate::credential::ports::Clock;
use crate::credential::ports::CredentialServicePort;
use crate::credential::ports::RefreshTokenRepository;
use crate::domain::deadline::Deadline;

/// Password length bounds, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl PasswordPolicy {
    /// # Errors
    /// * `PasswordTooShort` / `PasswordTooLong` - Outside configured bounds
    pub fn check(&self, password: &str) -> Result<(), ValidationError> {
        let length = password.chars().count();
        if length < self.min_length {
            Err(ValidationError::PasswordTooShort {
                min: self.min_length,
            })
        } else if length > self.max_length {
            Err(ValidationError::PasswordTooLong {
                max: self.max_length,
            })
        } else {
            Ok(())
        }
    }
}

/// Domain service implementation for signup, login and refresh exchange.
///
/// Holds no state of its own beyond references to the hasher, the token
/// issuer and the two repositories.
pub struct CredentialService<AR, RR>
where
    AR: AccountRepository,
    RR: RefreshTokenRepository,
{
    accounts: Arc<AR>,
    refresh_tokens: Arc<RR>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<TokenIssuer>,
    policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl<AR, RR> CredentialService<AR, RR>
where
    AR: AccountRepository,
    RR: RefreshTokenRepository,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `refresh_tokens` - Refresh credential persistence implementation
    /// * `hasher` - Password hasher selected by configuration
    /// * `issuer` - Token issuer/validator holding the signing secret
    /// * `policy` - Password length bounds
    /// * `clock` - Time source, read once per operation
    pub fn new(
        accounts: Arc<AR>,
        refresh_tokens: Arc<RR>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<TokenIssuer>,
        policy: PasswordPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            hasher,
            issuer,
            policy,
            clock,
        }
    }

    /// Generate a salt and hash `password` off the async workers.
    async fn hash_password(&self, password: String) -> Result<(Vec<u8>, Vec<u8>), CredentialError> {
        let hasher = Arc::clone(&self.hasher);

        let result = tokio::task::spawn_blocking(move || {
            let salt = hasher.generate_salt();
            hasher
                .hash(password.as_bytes(), &salt)
                .map(|digest| (digest, salt))
        })
        .await
        .map_err(|e| CredentialError::Unknown(format!("hashing task failed: {}", e)))?;

        Ok(result?)
    }

    async fn verify_password(
        &self,
        password: String,
        credential: PasswordCredential,
    ) -> Result<bool, CredentialError> {
        let hasher = Arc::clone(&self.hasher);

        let result = tokio::task::spawn_blocking(move || {
            hasher.verify(
                password.as_bytes(),
                &credential.password_hash,
                &credential.password_salt,
            )
        })
        .await
        .map_err(|e| CredentialError::Unknown(format!("verification task failed: {}", e)))?;

        Ok(result?)
    }
}

fn signing_error(err: JwtError) -> CredentialError {
    CredentialError::TokenSigning(err.to_string())
}

#[async_trait]
impl<AR, RR> CredentialServicePort for CredentialService<AR, RR>
where
    AR: AccountRepository,
    RR: RefreshTokenRepository,
{
    async fn signup(
        &self,
        command: SignupCommand,
        deadline: Deadline,
    ) -> Result<IssuedTokens, CredentialError> {
        if command.email.is_empty() || command.password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        let email = EmailAddress::new(command.email)?;
        self.policy.check(&command.password)?;

        // Advisory only; the unique index decides concurrent signups.
        if deadline.run(self.accounts.email_exists(&email)).await? {
            tracing::debug!("Signup rejected: email already registered");
            return Err(CredentialError::EmailAlreadyExists(email.to_string()));
        }

        let (password_hash, password_salt) = self.hash_password(command.password).await?;

        let now = self.clock.now();
        let account_id = AccountId::new();
        let token_id = RefreshTokenId::new();
        let subject = account_id.to_string();

        let access = self
            .issuer
            .issue_access(&subject, AuthMethod::EmailPassword.as_str(), now)
            .map_err(signing_error)?;
        let refresh = self
            .issuer
            .issue_refresh(&token_id.to_string(), &subject, now)
            .map_err(signing_error)?;

        let new_account = NewAccount {
            account: Account {
                id: account_id,
                email,
                auth_method: AuthMethod::EmailPassword,
                is_email_verified: false,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            password: PasswordCredential {
                credential_id: uuid::Uuid::new_v4(),
                account_id,
                password_hash,
                password_salt,
                created_at: now,
                updated_at: now,
            },
            refresh_token: RefreshCredential {
                token_id,
                account_id,
                token: refresh.token.clone(),
                revoked: false,
                created_at: now,
                expires_at: refresh.expires_at,
                last_used: now,
            },
        };

        let account = deadline
            .run(self.accounts.create_with_credentials(new_account))
            .await
            .map_err(|e| {
                if !matches!(e, CredentialError::EmailAlreadyExists(_)) {
                    tracing::error!("Failed to create account: {}", e);
                }
                e
            })?;

        tracing::info!(account_id = %account.id, "Account created");

        Ok(IssuedTokens {
            account_id: account.id,
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    async fn login(
        &self,
        command: LoginCommand,
        deadline: Deadline,
    ) -> Result<IssuedTokens, CredentialError> {
        if command.email.is_empty() || command.password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        let found = deadline
            .run(self.accounts.find_by_email(&command.email))
            .await?;

        let Some(found) = found else {
            tracing::debug!("Login rejected: no active account");
            return Err(CredentialError::InvalidCredentials);
        };

        if found.account.auth_method != AuthMethod::EmailPassword {
            tracing::debug!(account_id = %found.account.id, "Login rejected: auth method mismatch");
            return Err(CredentialError::InvalidCredentials);
        }

        let Some(credential) = found.password else {
            tracing::warn!(account_id = %found.account.id, "Password account without credential");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.verify_password(command.password, credential).await? {
            tracing::debug!(account_id = %found.account.id, "Login rejected: password mismatch");
            return Err(CredentialError::InvalidCredentials);
        }

        let now = self.clock.now();
        let account_id = found.account.id;
        let token_id = RefreshTokenId::new();
        let subject = account_id.to_string();

        let access = self
            .issuer
            .issue_access(&subject, AuthMethod::EmailPassword.as_str(), now)
            .map_err(signing_error)?;
        let refresh = self
            .issuer
            .issue_refresh(&token_id.to_string(), &subject, now)
            .map_err(signing_error)?;

        deadline
            .run(self.refresh_tokens.store(RefreshCredential {
                token_id,
                account_id,
                token: refresh.token.clone(),
                revoked: false,
                created_at: now,
                expires_at: refresh.expires_at,
                last_used: now,
            }))
            .await
            .map_err(|e| {
                tracing::error!("Failed to store refresh token: {}", e);
                e
            })?;

        tracing::info!(account_id = %account_id, "Login succeeded");

        Ok(IssuedTokens {
            account_id,
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    async fn refresh(
        &self,
        command: RefreshCommand,
        deadline: Deadline,
    ) -> Result<RefreshedToken, CredentialError> {
        if command.refresh_token.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        let now = self.clock.now();

        let claims = self
            .issuer
            .validate_refresh(&command.refresh_token, now)
            .map_err(|_| CredentialError::InvalidOrExpiredToken)?;

        let token_id = RefreshTokenId::from_string(&claims.jti)
            .map_err(|_| CredentialError::InvalidOrExpiredToken)?;

        match deadline.run(self.refresh_tokens.is_revoked(&token_id)).await {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!(token_id = %token_id, "Refresh rejected: token revoked");
                return Err(CredentialError::InvalidOrExpiredToken);
            }
            Err(CredentialError::RefreshTokenNotFound) => {
                tracing::debug!(token_id = %token_id, "Refresh rejected: token unknown");
                return Err(CredentialError::InvalidOrExpiredToken);
            }
            Err(e) => {
                tracing::error!("Failed to check refresh token revocation: {}", e);
                return Err(e);
            }
        }

        let account_id = AccountId::from_string(&claims.sub)
            .map_err(|_| CredentialError::InvalidOrExpiredToken)?;

        let account = match deadline.run(self.accounts.find_by_id(&account_id)).await {
            Ok(Some(account)) if account.is_active => account,
            Ok(_) => {
                tracing::debug!(account_id = %account_id, "Refresh rejected: account inactive or gone");
                return Err(CredentialError::InvalidOrExpiredToken);
            }
            Err(e) => {
                tracing::error!("Failed to load account for refresh: {}", e);
                return Err(e);
            }
        };

        match deadline
            .run(self.refresh_tokens.mark_last_used(&token_id, now))
            .await
        {
            Ok(()) => {}
            Err(CredentialError::RefreshTokenNotFound) => {
                return Err(CredentialError::InvalidOrExpiredToken)
            }
            Err(e) => {
                tracing::error!("Failed to update refresh token last use: {}", e);
                return Err(e);
            }
        }

        let access = self
            .issuer
            .issue_access(&claims.sub, account.auth_method.as_str(), now)
            .map_err(signing_error)?;

        Ok(RefreshedToken {
            access_token: access.token,
        })
    }
}
