use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result, SqlitePool};

use super::utils::now;

pub const DEFAULT_COMMENT_LIMIT: i64 = 30;
pub const MAX_COMMENT_LIMIT: i64 = 300;

/// A comment joined with its author's current username.
#[derive(Debug, Clone, FromRow)]
pub struct CommentView {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Missing, unparsable, or non-positive limits fall back to the default;
/// anything larger than the maximum is capped.
pub fn clamp_limit(requested: Option<&str>) -> i64 {
    match requested.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => n.min(MAX_COMMENT_LIMIT),
        _ => DEFAULT_COMMENT_LIMIT,
    }
}

/// Limit for the "load more" link, or `None` when the page shown is not
/// full or already at the cap.
pub fn next_limit(shown: usize, limit: i64) -> Option<i64> {
    if (shown as i64) < limit || limit >= MAX_COMMENT_LIMIT {
        return None;
    }
    Some((limit + DEFAULT_COMMENT_LIMIT).min(MAX_COMMENT_LIMIT))
}

pub async fn add_comment(pool: &SqlitePool, user_id: i64, game_id: &str, body: &str) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO comments (user_id, game_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(user_id)
    .bind(game_id)
    .bind(body)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Newest first. Row ids grow with insertion time, so they order the list.
pub async fn comments_for_game(
    pool: &SqlitePool,
    game_id: &str,
    limit: i64,
) -> Result<Vec<CommentView>> {
    sqlx::query_as::<_, CommentView>(
        "SELECT c.id, c.user_id, u.username, c.body, c.created_at
         FROM comments c JOIN users u ON u.id = c.user_id
         WHERE c.game_id = ?1
         ORDER BY c.id DESC
         LIMIT ?2",
    )
    .bind(game_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
