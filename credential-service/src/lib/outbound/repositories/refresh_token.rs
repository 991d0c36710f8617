use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::Row;
use sqlx::SqlitePool;

use super::database_error;
use super::is_unique_violation;
use crate::credential::errors::CredentialError;
use crate::credential::models::AccountId;
use crate::credential::models::RefreshCredential;
use crate::credential::models::RefreshTokenId;
use crate::credential::ports::RefreshTokenRepository;

pub struct SqliteRefreshTokenRepository {
    pool: SqlitePool,
}

impl SqliteRefreshTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for SqliteRefreshTokenRepository {
    async fn store(&self, credential: RefreshCredential) -> Result<(), CredentialError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_id, account_id, token, revoked, created_at, expires_at, last_used)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(credential.token_id.0)
        .bind(credential.account_id.0)
        .bind(&credential.token)
        .bind(credential.revoked)
        .bind(credential.created_at)
        .bind(credential.expires_at)
        .bind(credential.last_used)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return CredentialError::TokenIdConflict;
            }
            database_error(e)
        })?;

        Ok(())
    }

    async fn is_revoked(&self, id: &RefreshTokenId) -> Result<bool, CredentialError> {
        sqlx::query_scalar::<_, bool>("SELECT revoked FROM refresh_tokens WHERE token_id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(CredentialError::RefreshTokenNotFound)
    }

    async fn mark_last_used(
        &self,
        id: &RefreshTokenId,
        used_at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query("UPDATE refresh_tokens SET last_used = ? WHERE token_id = ?")
            .bind(used_at)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::RefreshTokenNotFound);
        }

        Ok(())
    }

    async fn revoke(&self, id: &RefreshTokenId) -> Result<(), CredentialError> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token_id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::RefreshTokenNotFound);
        }

        tracing::info!(token_id = %id, "Refresh token revoked");

        Ok(())
    }

    async fn revoke_all_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<u64, CredentialError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = 1 WHERE account_id = ? AND revoked = 0",
        )
        .bind(account_id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::info!(
            account_id = %account_id,
            revoked = result.rows_affected(),
            "Refresh tokens revoked for account"
        );

        Ok(result.rows_affected())
    }

    async fn find(
        &self,
        id: &RefreshTokenId,
    ) -> Result<Option<RefreshCredential>, CredentialError> {
        let row = sqlx::query(
            r#"
            SELECT token_id, account_id, token, revoked, created_at, expires_at, last_used
            FROM refresh_tokens
            WHERE token_id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some(r) => Ok(Some(RefreshCredential {
                token_id: RefreshTokenId(r.try_get("token_id").map_err(database_error)?),
                account_id: AccountId(r.try_get("account_id").map_err(database_error)?),
                token: r.try_get("token").map_err(database_error)?,
                revoked: r.try_get("revoked").map_err(database_error)?,
                created_at: r.try_get("created_at").map_err(database_error)?,
                expires_at: r.try_get("expires_at").map_err(database_error)?,
                last_used: r.try_get("last_used").map_err(database_error)?,
            })),
            None => Ok(None),
        }
    }
}
