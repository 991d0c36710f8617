use serde::Deserialize;
use serde::Serialize;

/// Token type carried in the `type` claim.
///
/// Keeps an access token from ever being accepted where a refresh token is
/// expected, and the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims with a bounded validity window.
pub trait TimeBoundClaims {
    /// Expiration time (Unix timestamp, seconds).
    fn expires_at(&self) -> i64;

    /// Token type claim.
    fn token_type(&self) -> TokenType;

    /// A token is expired once `now` reaches its expiration instant.
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at() <= now
    }
}

/// Claims of a short-lived access token.
///
/// Carries no identifier claim: access tokens are not individually revocable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,

    /// Subject (account identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Authentication method the subject used
    pub auth_method: String,
}

/// Claims of a persisted, revocable refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Token identifier, join key to the stored refresh credential
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Subject (account identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl TimeBoundClaims for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}

impl TimeBoundClaims for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}
