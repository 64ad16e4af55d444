use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result, SqlitePool};
use tracing::{debug, warn};

use super::utils::{is_live, now, tokens_match};

/// Server-side proof of a login. One row per user; every login overwrites it.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires: DateTime<Utc>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create the user's session record, or overwrite token/expiry on the
/// existing one and mark it valid again.
///
/// This is a single statement, so two concurrent logins for the same user
/// cannot both insert; the later write wins and the earlier token stops
/// matching.
pub async fn upsert_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (user_id, token, expires, is_valid, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, ?4, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
             token      = excluded.token,
             expires    = excluded.expires,
             is_valid   = 1,
             updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(token)
    .bind(expires)
    .bind(now())
    .execute(pool)
    .await?;

    debug!("Session upserted for user {}", user_id);
    Ok(())
}

/// Mark the record holding `token` invalid. Returns whether a row matched.
pub async fn invalidate_by_token(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE sessions SET is_valid = 0, updated_at = ?1 WHERE token = ?2")
        .bind(now())
        .bind(token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark the user's record invalid. Returns whether a row matched.
pub async fn invalidate_by_user(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    let result =
        sqlx::query("UPDATE sessions SET is_valid = 0, updated_at = ?1 WHERE user_id = ?2")
            .bind(now())
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_session_by_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<SessionRecord>> {
    sqlx::query_as::<_, SessionRecord>(
        "SELECT id, user_id, token, expires, is_valid, created_at, updated_at
         FROM sessions WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// True only when the user's record exists, is marked valid, holds `token`,
/// and has not expired.
///
/// Not a pure read: a record still marked valid that fails the token or
/// expiry check is flipped to invalid here, so a stale or forged token
/// revokes the stored session on first sight.
pub async fn is_valid(pool: &SqlitePool, user_id: i64, token: &str) -> Result<bool> {
    let Some(record) = find_session_by_user(pool, user_id).await? else {
        return Ok(false);
    };

    if !record.is_valid {
        return Ok(false);
    }

    let token_ok = tokens_match(&record.token, token);
    if token_ok && is_live(record.expires) {
        return Ok(true);
    }

    warn!(
        "Session for user {} failed validation (token match: {}); revoking",
        user_id, token_ok
    );
    sqlx::query("UPDATE sessions SET is_valid = 0, updated_at = ?1 WHERE id = ?2")
        .bind(now())
        .bind(record.id)
        .execute(pool)
        .await?;

    Ok(false)
}
