//! Password hashing and verification.
//!
//! Uses Argon2id with a per-call random salt. The stored credential is a
//! PHC-formatted string, so the salt and parameters travel with the hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use thiserror::Error;

/// Credential hashing errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hashing itself failed (bad parameters, entropy failure). Fatal to
    /// the calling operation; surfaced as an internal error upstream.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The stored hash is not a parsable PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// The password does not match the stored hash.
    #[error("password verification failed")]
    VerificationFailed,
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// Two calls with the same password yield different strings; both verify
/// against their own output.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password attempt against a stored PHC hash string.
///
/// The comparison of derived bytes is constant-time. A mismatch returns
/// `VerificationFailed`; it never panics.
pub fn verify_password(password: &str, stored: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;

    // Parameters come from the parsed hash, so old hashes keep verifying
    // after a parameter change.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_phc_string() {
        let hash = hash_password("Password1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn same_password_different_salts() {
        let h1 = hash_password("Password1").unwrap();
        let h2 = hash_password("Password1").unwrap();
        assert_ne!(h1, h2);

        assert!(verify_password("Password1", &h1).is_ok());
        assert!(verify_password("Password1", &h2).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("Password1").unwrap();
        let result = verify_password("Password2", &hash);
        assert!(matches!(result, Err(PasswordError::VerificationFailed)));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let result = verify_password("Password1", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn verify_handles_empty_stored_hash() {
        assert!(verify_password("Password1", "").is_err());
    }

    #[test]
    fn unicode_passwords_round_trip() {
        let hash = hash_password("пароль🔑123").unwrap();
        assert!(verify_password("пароль🔑123", &hash).is_ok());
        assert!(verify_password("пароль123", &hash).is_err());
    }
}
