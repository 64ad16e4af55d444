use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Current schema version.  Bump this whenever the schema changes and add a
/// corresponding migration arm in `run_migrations`.
const SCHEMA_VERSION: i64 = 1;

/// Open the pool described by `url`, creating the database file if needed.
pub async fn open_pool(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database url: {}", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database at {}", url))
}

/// Initialize the database schema and run any pending migrations.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_schema(pool).await?;
    run_migrations(pool).await?;
    Ok(())
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT    NOT NULL UNIQUE,
            email         TEXT    NOT NULL UNIQUE,
            password_hash TEXT    NOT NULL,
            created_at    TEXT    NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    // One row per user: a login overwrites the previous token.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL UNIQUE,
            token      TEXT    NOT NULL,
            expires    TEXT    NOT NULL,
            is_valid   INTEGER NOT NULL DEFAULT 1,
            created_at TEXT    NOT NULL,
            updated_at TEXT    NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ratings (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   INTEGER NOT NULL,
            game_id   TEXT    NOT NULL,
            game_name TEXT    NOT NULL,
            score     TEXT    NOT NULL,
            rated_at  TEXT    NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            UNIQUE(user_id, game_id)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ratings table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS comments (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL,
            game_id    TEXT    NOT NULL,
            body       TEXT    NOT NULL,
            created_at TEXT    NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create comments table")?;

    // --- Indexes --------------------------------------------------------
    for stmt in [
        "CREATE INDEX IF NOT EXISTS idx_users_username_lower ON users(lower(username))",
        "CREATE INDEX IF NOT EXISTS idx_sessions_token       ON sessions(token)",
        "CREATE INDEX IF NOT EXISTS idx_ratings_game         ON ratings(game_id)",
        "CREATE INDEX IF NOT EXISTS idx_comments_game        ON comments(game_id, created_at)",
    ] {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create index: {}", stmt))?;
    }

    Ok(())
}

/// Uses `PRAGMA user_version` as the migration counter.
async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .context("Failed to read schema version")?;

    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    info!(
        "Database schema at version {}; target version {}.",
        current_version, SCHEMA_VERSION
    );

    // PRAGMA does not take bound parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(pool)
        .await
        .context("Failed to set schema version")?;

    info!("Schema version set to {}.", SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_tables_sets_user_version() {
        let pool = memory_pool().await;
        create_tables(&pool).await.unwrap();

        let v: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(v, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn create_tables_is_idempotent() {
        let pool = memory_pool().await;
        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();
    }
}
