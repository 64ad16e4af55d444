use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result, SqlitePool};
use tracing::warn;

use shared::types::{RatingScore, RatingTally, ReviewedGame};

use super::utils::now;

#[derive(Debug, FromRow)]
struct RatingRow {
    game_id: String,
    game_name: String,
    score: String,
    rated_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_reviewed(self) -> Option<ReviewedGame> {
        match self.score.parse::<RatingScore>() {
            Ok(score) => Some(ReviewedGame {
                game_id: self.game_id,
                game_name: self.game_name,
                score,
                rated_at: self.rated_at,
            }),
            Err(e) => {
                warn!("Skipping stored rating for game {}: {}", self.game_id, e);
                None
            }
        }
    }
}

/// One rating per (user, game); rating again replaces the score.
pub async fn upsert_rating(
    pool: &SqlitePool,
    user_id: i64,
    game_id: &str,
    game_name: &str,
    score: RatingScore,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO ratings (user_id, game_id, game_name, score, rated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, game_id) DO UPDATE SET
             game_name = excluded.game_name,
             score     = excluded.score,
             rated_at  = excluded.rated_at",
    )
    .bind(user_id)
    .bind(game_id)
    .bind(game_name)
    .bind(score.as_str())
    .bind(now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn user_rating(
    pool: &SqlitePool,
    user_id: i64,
    game_id: &str,
) -> Result<Option<RatingScore>> {
    let score: Option<String> =
        sqlx::query_scalar("SELECT score FROM ratings WHERE user_id = ?1 AND game_id = ?2")
            .bind(user_id)
            .bind(game_id)
            .fetch_optional(pool)
            .await?;
    Ok(score.and_then(|s| s.parse().ok()))
}

pub async fn tally_for_game(pool: &SqlitePool, game_id: &str) -> Result<RatingTally> {
    let scores: Vec<String> = sqlx::query_scalar("SELECT score FROM ratings WHERE game_id = ?1")
        .bind(game_id)
        .fetch_all(pool)
        .await?;

    Ok(RatingTally::from_scores(
        scores.iter().filter_map(|s| s.parse::<RatingScore>().ok()),
    ))
}

/// The user's ratings, most recent first.
pub async fn reviewed_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ReviewedGame>> {
    let mut rows = sqlx::query_as::<_, RatingRow>(
        "SELECT game_id, game_name, score, rated_at FROM ratings WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    // Stored timestamps are text with variable precision; order on the parsed value.
    rows.sort_by(|a, b| b.rated_at.cmp(&a.rated_at));
    Ok(rows.into_iter().filter_map(RatingRow::into_reviewed).collect())
}
