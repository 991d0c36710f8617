use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::TimeBoundClaims;
use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Pinned to HS256 and a single issuer. Expiry is not checked against the
/// system clock; callers pass the validation instant explicitly.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    validation: Validation,
}

impl JwtHandler {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `issuer` - Value of the `iss` claim issued and required on validation
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            validation,
        }
    }

    /// Issuer stamped into every token.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(Self::ALGORITHM);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Verifies the signature, that the header algorithm is exactly HS256, the
    /// issuer, the presence of the registered claims and that the token has
    /// not expired as of `now`.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    /// * `now` - Validation instant (Unix timestamp)
    ///
    /// # Errors
    /// * `InvalidOrExpired` - Any validation failure
    pub fn decode<T>(&self, token: &str, now: i64) -> Result<T, JwtError>
    where
        T: DeserializeOwned + TimeBoundClaims,
    {
        let claims = decode::<T>(token, &self.decoding_key, &self.validation)
            .map_err(|_| JwtError::InvalidOrExpired)?
            .claims;

        if claims.is_expired(now) {
            return Err(JwtError::InvalidOrExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::AccessClaims;
    use crate::jwt::claims::TokenType;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";
    const ISSUER: &str = "credential-service";

    fn claims(iat: i64, exp: i64) -> AccessClaims {
        AccessClaims {
            iss: ISSUER.to_string(),
            sub: "user123".to_string(),
            iat,
            exp,
            token_type: TokenType::Access,
            auth_method: "emailpassword".to_string(),
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(SECRET, ISSUER);
        let claims = claims(1_000, 1_900);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: AccessClaims = handler.decode(&token, 1_000).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET, ISSUER);

        let result = handler.decode::<AccessClaims>("invalid.token.here", 0);
        assert_eq!(result, Err(JwtError::InvalidOrExpired));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!", ISSUER);
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!", ISSUER);

        let token = handler1.encode(&claims(0, 900)).unwrap();

        let result = handler2.decode::<AccessClaims>(&token, 0);
        assert_eq!(result, Err(JwtError::InvalidOrExpired));
    }

    #[test]
    fn test_decode_rejects_algorithm_substitution() {
        let handler = JwtHandler::new(SECRET, ISSUER);

        // Same secret, different MAC algorithm in the header.
        let forged = encode(
            &Header::new(Algorithm::HS512),
            &claims(0, 900),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = handler.decode::<AccessClaims>(&forged, 0);
        assert_eq!(result, Err(JwtError::InvalidOrExpired));
    }

    #[test]
    fn test_decode_expired_with_injected_time() {
        let handler = JwtHandler::new(SECRET, ISSUER);
        let token = handler.encode(&claims(1_000, 1_900)).unwrap();

        assert!(handler.decode::<AccessClaims>(&token, 1_899).is_ok());
        assert_eq!(
            handler.decode::<AccessClaims>(&token, 1_900),
            Err(JwtError::InvalidOrExpired)
        );
        assert_eq!(
            handler.decode::<AccessClaims>(&token, 5_000),
            Err(JwtError::InvalidOrExpired)
        );
    }

    #[test]
    fn test_decode_with_wrong_issuer() {
        let issuer_a = JwtHandler::new(SECRET, "service-a");
        let issuer_b = JwtHandler::new(SECRET, "service-b");

        let mut foreign = claims(0, 900);
        foreign.iss = "service-a".to_string();
        let token = issuer_a.encode(&foreign).unwrap();

        assert_eq!(
            issuer_b.decode::<AccessClaims>(&token, 0),
            Err(JwtError::InvalidOrExpired)
        );
    }
}
