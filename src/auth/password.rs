use anyhow::ensure;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Passwords must be strictly longer than five characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Whether `plain` satisfies the account password policy.
pub fn meets_policy(plain: &str) -> bool {
    plain.chars().count() >= MIN_PASSWORD_LEN
}

/// Argon2id PHC string for `plain`; refuses passwords below [`MIN_PASSWORD_LEN`].
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    ensure!(
        meets_policy(plain),
        "password shorter than {} characters",
        MIN_PASSWORD_LEN
    );
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when `stored` is not a PHC string.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
