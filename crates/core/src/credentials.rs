//! PBKDF2-SHA256 password hashing (600k iterations) for user accounts.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;

const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("RNG failure: {0}")]
    Rng(String),
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hex-encoded hash and salt as stored in `users.password_hash` / `users.password_salt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

pub fn hash_password(password: &str) -> Result<PasswordHash, CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::TooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt).map_err(|e| CredentialError::Rng(e.to_string()))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    Ok(PasswordHash {
        hash: hex::encode(hash),
        salt: hex::encode(salt),
    })
}

pub fn verify_password(password: &str, stored: &PasswordHash) -> bool {
    let Ok(salt) = hex::decode(&stored.salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(&stored.hash) else {
        return false;
    };

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    // Constant-time comparison
    hash.len() == expected.len()
        && hash
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
