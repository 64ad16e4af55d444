use anyhow::{Context, Result, anyhow};
use hyper::StatusCode;
use tracing::{info, warn};

use crate::AppState;
use crate::database::users;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};
use crate::session::validate::validate_username_change;

async fn current_username(state: &AppState, user_id: i64) -> Result<String> {
    users::find_user_by_id(&state.db, user_id)
        .await?
        .map(|u| u.username)
        .ok_or_else(|| anyhow!("User {} not found", user_id))
}

/// GET /account/username (gated)
pub async fn handle_username_page(
    _req: HttpRequest,
    state: AppState,
    user_id: i64,
) -> Result<HttpResponse> {
    let current = current_username(&state, user_id).await?;
    deliver_page(views::username_page(&current, &[]))
}

/// POST /account/username (gated)
pub async fn handle_change_username(
    req: HttpRequest,
    state: AppState,
    user_id: i64,
) -> Result<HttpResponse> {
    let form = parse_form(req.body());
    let requested = form.get("username").map(|u| u.trim()).unwrap_or_default();

    let outcome = validate_username_change(&state.db, user_id, requested).await?;
    if !outcome.valid {
        warn!(
            "Username change rejected for user {}: {:?}",
            user_id,
            outcome.errors.iter().map(|e| e.to_code()).collect::<Vec<_>>()
        );
        let current = current_username(&state, user_id).await?;
        return deliver_html(
            StatusCode::BAD_REQUEST,
            views::username_page(&current, &outcome.messages()),
            None,
        );
    }

    users::update_username(&state.db, user_id, requested)
        .await
        .context("Failed to update username")?;

    info!("User {} changed username", user_id);
    deliver_redirect("/account")
}
