use chrono::{DateTime, Duration, Utc};

/// Current time, the single clock every store operation reads.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Absolute expiry for a session issued now.
pub fn session_expiry(days: i64) -> DateTime<Utc> {
    now() + Duration::days(days)
}

/// Strictly in the future; a session expiring this instant is already dead.
pub fn is_live(expires: DateTime<Utc>) -> bool {
    expires > now()
}

/// Compare session tokens without an early exit on the first differing byte.
pub fn tokens_match(stored: &str, presented: &str) -> bool {
    use subtle::ConstantTimeEq;
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString},
    };
    use rand::rngs::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))
}

/// Verify a password against its hash
pub fn verify_password(hash: &str, password: &str) -> anyhow::Result<bool> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordVerifier},
    };

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
