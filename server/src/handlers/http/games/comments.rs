use anyhow::{Context, Result};
use hyper::StatusCode;
use tracing::{debug, warn};

use crate::AppState;
use crate::catalog::is_valid_game_id;
use crate::database::comments;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};

use super::game_id;

pub const INVALID_COMMENT: &str = "Please enter a valid comment.";

/// Stored comments must say something: at least one ASCII letter.
pub fn is_valid_comment(body: &str) -> bool {
    body.chars().any(|c| c.is_ascii_alphabetic())
}

/// GET /game/:id/comments?limit=N
pub async fn handle_comments(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let id = game_id(&req)?;
    if !is_valid_game_id(&id) {
        return deliver_not_found();
    }

    let params = query_params(req.uri());
    let limit = comments::clamp_limit(params.get("limit").map(String::as_str));
    let signed_in = state.envelope(req.headers()).user_id().is_some();

    let list = comments::comments_for_game(&state.db, &id, limit).await?;
    debug!("Showing {} comments for game {}", list.len(), id);

    let more = comments::next_limit(list.len(), limit);
    deliver_page(views::comments_page(&id, &list, more, signed_in))
}

/// POST /game/:id/comments (gated)
pub async fn handle_post_comment(
    req: HttpRequest,
    state: AppState,
    user_id: i64,
) -> Result<HttpResponse> {
    let id = game_id(&req)?;
    let form = parse_form(req.body());
    let body = form.get("comment").map(|c| c.trim()).unwrap_or_default();

    if !is_valid_game_id(&id) || !is_valid_comment(body) {
        warn!("Rejected comment from user {} on game {}", user_id, id);
        return deliver_error_page(StatusCode::BAD_REQUEST, INVALID_COMMENT);
    }

    comments::add_comment(&state.db, user_id, &id, body)
        .await
        .context("Failed to store comment")?;

    deliver_redirect(&format!("/game/{}/comments", id))
}
