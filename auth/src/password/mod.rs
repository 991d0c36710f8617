pub mod argon2;
pub mod errors;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ::argon2::password_hash::rand_core::OsRng;
use ::argon2::password_hash::rand_core::RngCore;
use subtle::ConstantTimeEq;

pub use self::argon2::Argon2Hasher;
pub use errors::PasswordError;

/// Supported password hashing algorithms, keyed by configuration tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Argon2id,
}

impl FromStr for HashAlgorithm {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(HashAlgorithm::Argon2id),
            other => Err(PasswordError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Argon2id => f.write_str("argon2id"),
        }
    }
}

/// Cost parameters shared by the key-derivation hashers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashParams {
    /// Number of passes over memory
    pub iterations: u32,
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
    /// Digest length in bytes
    pub output_length: usize,
    /// Salt length in bytes
    pub salt_length: usize,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            iterations: 2,
            memory_kib: 19 * 1024,
            parallelism: 1,
            output_length: 32,
            salt_length: 16,
        }
    }
}

/// Password hashing contract, polymorphic over algorithm.
///
/// Implementations only provide `hash`; `verify` recomputes the digest with the
/// stored salt and compares it in constant time.
pub trait PasswordHasher: Send + Sync + fmt::Debug {
    /// Algorithm implemented by this hasher.
    fn algorithm(&self) -> HashAlgorithm;

    /// Configured salt length in bytes.
    fn salt_length(&self) -> usize;

    /// Derive a digest from a plaintext password and salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Key derivation rejected the input
    fn hash(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, PasswordError>;

    /// Verify a plaintext password against a stored digest and salt.
    ///
    /// # Returns
    /// True if the recomputed digest matches byte-for-byte
    ///
    /// # Errors
    /// * `HashingFailed` - Key derivation rejected the input
    fn verify(&self, password: &[u8], digest: &[u8], salt: &[u8]) -> Result<bool, PasswordError> {
        let candidate = self.hash(password, salt)?;
        Ok(bool::from(candidate.as_slice().ct_eq(digest)))
    }

    /// Generate a fresh random salt of the configured length from the OS CSPRNG.
    fn generate_salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; self.salt_length()];
        OsRng.fill_bytes(&mut salt);
        salt
    }
}

/// Build the hasher selected by a configuration tag.
///
/// # Arguments
/// * `algorithm` - Configuration tag (currently `argon2` / `argon2id`)
/// * `params` - Cost parameters for the selected algorithm
///
/// # Errors
/// * `UnsupportedAlgorithm` - Tag does not name a known algorithm
/// * `InvalidParameters` - Parameters rejected by the algorithm
pub fn create_hasher(
    algorithm: &str,
    params: &HashParams,
) -> Result<Arc<dyn PasswordHasher>, PasswordError> {
    match algorithm.parse::<HashAlgorithm>()? {
        HashAlgorithm::Argon2id => Ok(Arc::new(Argon2Hasher::new(params)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> HashParams {
        HashParams {
            iterations: 1,
            memory_kib: 1024,
            parallelism: 1,
            output_length: 32,
            salt_length: 16,
        }
    }

    #[test]
    fn test_create_hasher_argon2() {
        let hasher = create_hasher("argon2", &cheap_params()).expect("argon2 should be supported");
        assert_eq!(hasher.algorithm(), HashAlgorithm::Argon2id);
    }

    #[test]
    fn test_create_hasher_unsupported_algorithm() {
        let result = create_hasher("bcrypt", &cheap_params());
        assert!(matches!(
            result,
            Err(PasswordError::UnsupportedAlgorithm(ref tag)) if tag == "bcrypt"
        ));
    }

    #[test]
    fn test_generate_salt_length_and_uniqueness() {
        let params = HashParams {
            salt_length: 24,
            ..cheap_params()
        };
        let hasher = create_hasher("argon2id", &params).unwrap();

        let first = hasher.generate_salt();
        let second = hasher.generate_salt();

        assert_eq!(first.len(), 24);
        assert_eq!(second.len(), 24);
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_error_does_not_leak_password() {
        let hasher = create_hasher("argon2", &cheap_params()).unwrap();

        // Salt shorter than the Argon2 minimum is rejected by the KDF itself.
        let err = hasher.hash(b"super-secret-input", b"abc").unwrap_err();
        assert!(!err.to_string().contains("super-secret-input"));
    }
}
