use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

/// One-way password hashing with Argon2id and a per-hash random salt.
/// Plaintext passwords are never stored or logged.
#[derive(Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("password hashing failed: {}", e)))
    }

    /// Returns `Ok(false)` on a mismatch; an error only means the stored
    /// hash string itself could not be parsed.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::InternalError(format!("malformed password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
