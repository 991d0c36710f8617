//! Authentication utilities library
//!
//! Provides the credential primitives used by the credential service:
//! - Password hashing with explicit salts, polymorphic over algorithm (Argon2id today)
//! - HS256 JWT encoding and validation against a caller-supplied instant
//! - Access and refresh token issuance
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::password::{create_hasher, HashParams};
//!
//! let params = HashParams { iterations: 1, memory_kib: 1024, ..HashParams::default() };
//! let hasher = create_hasher("argon2", &params).unwrap();
//! let salt = hasher.generate_salt();
//! let digest = hasher.hash(b"my_password", &salt).unwrap();
//! assert!(hasher.verify(b"my_password", &digest, &salt).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenIssuer;
//! use chrono::{Duration, Utc};
//!
//! let issuer = TokenIssuer::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "credential-service",
//!     Duration::minutes(15),
//!     Duration::days(7),
//! );
//! let now = Utc::now();
//! let access = issuer.issue_access("account-1", "emailpassword", now).unwrap();
//! let claims = issuer.validate_access(&access.token, now).unwrap();
//! assert_eq!(claims.sub, "account-1");
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::SignedToken;
pub use issuer::TokenIssuer;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::TokenType;
pub use password::create_hasher;
pub use password::HashAlgorithm;
pub use password::HashParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
