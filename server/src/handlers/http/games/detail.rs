use anyhow::{Context, Result};
use hyper::StatusCode;
use tracing::{info, warn};

use shared::types::RatingScore;

use crate::AppState;
use crate::catalog::is_valid_game_id;
use crate::database::ratings;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};

use super::game_id;

pub const RATE_FAILED: &str = "Failed to rate game";

/// GET /game/:id
pub async fn handle_game(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let id = game_id(&req)?;
    let viewer = state.envelope(req.headers()).user_id();

    let Some(game) = state.catalog.game(&id).await? else {
        return deliver_not_found();
    };

    // Ratings are keyed by the catalog's numeric id even when the page was
    // reached through a slug.
    let key = game.id.to_string();
    let tally = ratings::tally_for_game(&state.db, &key).await?;
    let current = match viewer {
        Some(user_id) => ratings::user_rating(&state.db, user_id, &key).await?,
        None => None,
    };

    deliver_page(views::game_page(&game, &tally, current, viewer.is_some()))
}

/// POST /game/:id (gated)
///
/// Form: `rating` (one of the score names), `game_name`.
pub async fn handle_rate(req: HttpRequest, state: AppState, user_id: i64) -> Result<HttpResponse> {
    let id = game_id(&req)?;
    let form = parse_form(req.body());

    let score = form.get("rating").and_then(|r| r.parse::<RatingScore>().ok());
    let game_name = form
        .get("game_name")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty());

    let (Some(score), Some(game_name), true) = (score, game_name, is_valid_game_id(&id)) else {
        warn!("Rejected rating from user {} for game {}", user_id, id);
        return deliver_error_page(StatusCode::BAD_REQUEST, RATE_FAILED);
    };

    ratings::upsert_rating(&state.db, user_id, &id, game_name, score)
        .await
        .context("Failed to store rating")?;

    info!("User {} rated game {} as {}", user_id, id, score);
    deliver_redirect(&format!("/game/{}/comments", id))
}
