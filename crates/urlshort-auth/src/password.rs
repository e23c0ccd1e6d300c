//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::error::AuthError;

/// Slow, salted one-way hashing for low-entropy human secrets.
///
/// If a pepper is configured it is prepended to the password before both
/// hashing and verification.
#[derive(Clone, Default)]
pub struct CredentialVerifier {
    pepper: Option<String>,
}

impl CredentialVerifier {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    /// Hash a password into an Argon2id PHC string.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
        let params = Params::new(19456, 2, 1, None)
            .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let input = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(input.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// A mismatch is `false`, never an error. A stored hash that cannot be
    /// parsed is also `false` so that a corrupt record looks exactly like a
    /// wrong password to the caller; the condition is logged.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(error = %e, "stored password hash is malformed");
                return false;
            }
        };

        let input = self.peppered(password);
        match Argon2::default().verify_password(input.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                tracing::error!(error = %e, "password verification failed");
                false
            }
        }
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_string(),
        }
    }
}
