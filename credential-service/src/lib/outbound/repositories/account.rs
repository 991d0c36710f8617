use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::database_error;
use super::is_unique_violation;
use crate::credential::errors::CredentialError;
use crate::credential::models::Account;
use crate::credential::models::AccountId;
use crate::credential::models::AccountWithPassword;
use crate::credential::models::AuthMethod;
use crate::credential::models::EmailAddress;
use crate::credential::models::NewAccount;
use crate::credential::models::PasswordCredential;
use crate::credential::ports::AccountRepository;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account, CredentialError> {
        let email: String = row.try_get("email").map_err(database_error)?;
        let auth_method: String = row.try_get("auth_method").map_err(database_error)?;

        Ok(Account {
            id: AccountId(row.try_get("id").map_err(database_error)?),
            email: EmailAddress::new(email).map_err(|_| {
                CredentialError::DatabaseError("stored email address is invalid".to_string())
            })?,
            auth_method: AuthMethod::from(auth_method.as_str()),
            is_email_verified: row.try_get("is_email_verified").map_err(database_error)?,
            is_active: row.try_get("is_active").map_err(database_error)?,
            created_at: row.try_get("created_at").map_err(database_error)?,
            updated_at: row.try_get("updated_at").map_err(database_error)?,
        })
    }

    fn row_to_password(
        row: &SqliteRow,
        account_id: AccountId,
    ) -> Result<Option<PasswordCredential>, CredentialError> {
        let credential_id: Option<Uuid> = row.try_get("credential_id").map_err(database_error)?;

        match credential_id {
            Some(credential_id) => Ok(Some(PasswordCredential {
                credential_id,
                account_id,
                password_hash: row.try_get("password_hash").map_err(database_error)?,
                password_salt: row.try_get("password_salt").map_err(database_error)?,
                created_at: row.try_get("password_created_at").map_err(database_error)?,
                updated_at: row.try_get("password_updated_at").map_err(database_error)?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, CredentialError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM accounts WHERE email = ? AND is_active = 1)
            "#,
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)
    }

    async fn create_with_credentials(
        &self,
        new_account: NewAccount,
    ) -> Result<Account, CredentialError> {
        let NewAccount {
            account,
            password,
            refresh_token,
        } = new_account;

        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, auth_method, is_email_verified, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.auth_method.as_str())
        .bind(account.is_email_verified)
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return CredentialError::EmailAlreadyExists(account.email.to_string());
            }
            database_error(e)
        })?;

        sqlx::query(
            r#"
            INSERT INTO password_credentials (credential_id, account_id, password_hash, password_salt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(password.credential_id)
        .bind(account.id.0)
        .bind(&password.password_hash)
        .bind(&password.password_salt)
        .bind(password.created_at)
        .bind(password.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_id, account_id, token, revoked, created_at, expires_at, last_used)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(refresh_token.token_id.0)
        .bind(account.id.0)
        .bind(&refresh_token.token)
        .bind(refresh_token.revoked)
        .bind(refresh_token.created_at)
        .bind(refresh_token.expires_at)
        .bind(refresh_token.last_used)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return CredentialError::TokenIdConflict;
            }
            database_error(e)
        })?;

        tx.commit().await.map_err(database_error)?;

        Ok(account)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountWithPassword>, CredentialError> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.email, a.auth_method, a.is_email_verified, a.is_active,
                   a.created_at, a.updated_at,
                   p.credential_id, p.password_hash, p.password_salt,
                   p.created_at AS password_created_at, p.updated_at AS password_updated_at
            FROM accounts a
            LEFT JOIN password_credentials p ON p.account_id = a.id
            WHERE a.email = ? AND a.is_active = 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some(r) => {
                let account = Self::row_to_account(&r)?;
                let password = Self::row_to_password(&r, account.id)?;
                Ok(Some(AccountWithPassword { account, password }))
            }
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, CredentialError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, auth_method, is_email_verified, is_active, created_at, updated_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &[u8],
        password_salt: &[u8],
        updated_at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query(
            r#"
            UPDATE password_credentials
            SET password_hash = ?, password_salt = ?, updated_at = ?
            WHERE account_id = ?
            "#,
        )
        .bind(password_hash)
        .bind(password_salt)
        .bind(updated_at)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::AccountNotFound);
        }

        Ok(())
    }

    async fn set_active(
        &self,
        id: &AccountId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(active)
        .bind(updated_at)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return CredentialError::EmailAlreadyExists(id.to_string());
            }
            database_error(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::AccountNotFound);
        }

        Ok(())
    }
}
