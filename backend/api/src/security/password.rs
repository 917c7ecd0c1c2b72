/// Password hashing and verification using Argon2id with a PBKDF2 fallback
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use pbkdf2::Pbkdf2;

use crate::config::Config;
use crate::error::AuthError;

/// Hashes plaintext credentials into self-describing PHC strings and
/// verifies candidates against stored hashes of either supported scheme.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(
        time_cost: u32,
        memory_cost: u32,
        parallelism: u32,
        hash_len: usize,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_cost, time_cost, parallelism, Some(hash_len))
            .map_err(|e| AuthError::InvalidInput(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Self::new(
            config.argon2_time_cost,
            config.argon2_memory_cost,
            config.argon2_parallelism,
            config.argon2_hash_len,
        )
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash a plaintext secret. Argon2id is the primary scheme; if it fails,
    /// PBKDF2-SHA256 is attempted before giving up with `HashingUnavailable`.
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(rand::thread_rng());

        match self.argon2().hash_password(secret.as_bytes(), &salt) {
            Ok(hash) => Ok(hash.to_string()),
            Err(err) => {
                tracing::warn!(%err, "argon2 hashing failed, falling back to pbkdf2");
                Pbkdf2
                    .hash_password(secret.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| {
                        tracing::error!(%err, "all hashing schemes failed");
                        AuthError::HashingUnavailable
                    })
            }
        }
    }

    /// Verify a candidate secret against a stored hash. The scheme is chosen
    /// by the hash's self-identifying prefix; malformed or foreign formats
    /// verify as `false` rather than erroring.
    pub fn verify(&self, secret: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        parsed
            .verify_password(&[&self.argon2(), &Pbkdf2], secret.as_bytes())
            .is_ok()
    }
}
