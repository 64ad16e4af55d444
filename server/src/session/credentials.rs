use anyhow::Result;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::database::{users, utils::verify_password};

pub const MIN_LOGIN_PASSWORD_LEN: usize = 6;

/// Check an email/password pair against the stored users.
///
/// Returns the user id on a match and `None` for every kind of wrong input.
/// Callers cannot tell an unknown email from a bad password. Only store
/// failures are errors.
pub async fn validate_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Option<i64>> {
    let email = email.trim();
    if email.is_empty() || password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        debug!("Credential check short-circuited on empty email or short password");
        return Ok(None);
    }

    let Some(user) = users::find_user_by_email(pool, email).await? else {
        return Ok(None);
    };

    match verify_password(&user.password_hash, password) {
        Ok(true) => Ok(Some(user.id)),
        Ok(false) => Ok(None),
        Err(e) => {
            warn!("Stored password hash for user {} is unreadable: {}", user.id, e);
            Ok(None)
        }
    }
}
