//! Password hashing adapter built on Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use argon2::{PasswordHasher as _, PasswordVerifier as _};
use congregate_application::PasswordHasher;
use congregate_core::{AppError, AppResult};

// OWASP password-storage baseline for Argon2id.
const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id implementation of the password hasher port.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the baseline cost parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("stored password hash is unreadable: {error}"))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use congregate_application::PasswordHasher;
    use congregate_core::AppResult;

    use super::Argon2PasswordHasher;

    #[test]
    fn round_trip_accepts_the_original_password() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("a-long-passphrase")?;
        assert!(hasher.verify_password("a-long-passphrase", &hash)?);
        Ok(())
    }

    #[test]
    fn different_password_is_rejected() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("a-long-passphrase")?;
        assert!(!hasher.verify_password("another-passphrase", &hash)?);
        Ok(())
    }

    #[test]
    fn each_hash_uses_a_fresh_salt() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash_password("a-long-passphrase")?;
        let second = hasher.hash_password("a-long-passphrase")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        let hasher = Argon2PasswordHasher::new();
        assert!(hasher.verify_password("anything", "not-a-phc-string").is_err());
    }
}
