use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;
use crate::jwt::TimeBoundClaims;
use crate::jwt::TokenType;

/// A signed token together with its expiration instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and validates access and refresh tokens.
///
/// Every timestamp is derived from the instant supplied by the caller, so an
/// access and a refresh token minted together share one issued-at value.
pub struct TokenIssuer {
    jwt: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret
    /// * `issuer` - Value of the `iss` claim
    /// * `access_ttl` - Lifetime of access tokens
    /// * `refresh_ttl` - Lifetime of refresh tokens
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            jwt: JwtHandler::new(secret, issuer),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mint an access token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_access(
        &self,
        subject: &str,
        auth_method: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, JwtError> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            iss: self.jwt.issuer().to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            token_type: TokenType::Access,
            auth_method: auth_method.to_string(),
        };

        Ok(SignedToken {
            token: self.jwt.encode(&claims)?,
            expires_at,
        })
    }

    /// Mint a refresh token identified by `token_id` for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_refresh(
        &self,
        token_id: &str,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, JwtError> {
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            jti: token_id.to_string(),
            iss: self.jwt.issuer().to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            token_type: TokenType::Refresh,
        };

        Ok(SignedToken {
            token: self.jwt.encode(&claims)?,
            expires_at,
        })
    }

    /// Validate an access token as of `now`.
    ///
    /// # Errors
    /// * `InvalidOrExpired` - Bad signature, wrong algorithm or issuer,
    ///   malformed, expired, or not an access token
    pub fn validate_access(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, JwtError> {
        self.validate(token, TokenType::Access, now)
    }

    /// Validate a refresh token as of `now`.
    ///
    /// # Errors
    /// * `InvalidOrExpired` - Bad signature, wrong algorithm or issuer,
    ///   malformed, expired, or not a refresh token
    pub fn validate_refresh(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, JwtError> {
        self.validate(token, TokenType::Refresh, now)
    }

    fn validate<T>(&self, token: &str, expected: TokenType, now: DateTime<Utc>) -> Result<T, JwtError>
    where
        T: serde::de::DeserializeOwned + TimeBoundClaims,
    {
        let claims: T = self.jwt.decode(token, now.timestamp())?;

        if claims.token_type() != expected {
            return Err(JwtError::InvalidOrExpired);
        }

        Ok(claims)
    }
}
