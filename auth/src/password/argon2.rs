use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use argon2::MIN_SALT_LEN;

use super::errors::PasswordError;
use super::HashAlgorithm;
use super::HashParams;
use super::PasswordHasher;

/// Argon2id key-derivation hasher with explicit salt.
///
/// Cost parameters are validated once at construction, so a misconfigured
/// hasher never reaches the first hash call.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    salt_length: usize,
}

impl Argon2Hasher {
    /// Create a new Argon2id hasher.
    ///
    /// # Arguments
    /// * `params` - Iteration count, memory cost, parallelism, output and salt lengths
    ///
    /// # Returns
    /// Configured Argon2Hasher instance
    ///
    /// # Errors
    /// * `InvalidParameters` - Cost parameters or salt length rejected by Argon2
    pub fn new(params: &HashParams) -> Result<Self, PasswordError> {
        if params.salt_length < MIN_SALT_LEN {
            return Err(PasswordError::InvalidParameters(format!(
                "salt length must be at least {} bytes, got {}",
                MIN_SALT_LEN,
                params.salt_length
            )));
        }

        let argon2_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(params.output_length),
        )
        .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self {
            params: argon2_params,
            salt_length: params.salt_length,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Argon2id
    }

    fn salt_length(&self) -> usize {
        self.salt_length
    }

    fn hash(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, PasswordError> {
        let mut digest = vec![0u8; self.params.output_len().unwrap_or(Params::DEFAULT_OUTPUT_LEN)];

        self.argon2()
            .hash_password_into(password, salt, &mut digest)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(digest)
    }
}
