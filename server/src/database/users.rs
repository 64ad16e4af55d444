use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result, SqlitePool};

use super::utils::now;

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRecord>> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE email = ?1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<UserRecord>> {
    sqlx::query_as::<_, UserRecord>(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Usernames are unique ignoring case.
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE lower(username) = lower(?1)")
            .bind(username)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Insert a user and return its id. `password_hash` must already be hashed.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Stores the name lowercased.
pub async fn update_username(pool: &SqlitePool, user_id: i64, username: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET username = ?1 WHERE id = ?2")
        .bind(username.to_lowercase())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_password_hash(
    pool: &SqlitePool,
    user_id: i64,
    password_hash: &str,
) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
