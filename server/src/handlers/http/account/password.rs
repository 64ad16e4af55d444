use anyhow::{Context, Result};
use hyper::StatusCode;
use tracing::{info, warn};

use crate::AppState;
use crate::database::{users, utils::hash_password};
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};
use crate::session::validate::validate_password_change;

/// GET /account/password (gated)
pub async fn handle_password_page(
    _req: HttpRequest,
    _state: AppState,
    _user_id: i64,
) -> Result<HttpResponse> {
    deliver_page(views::password_page(&[]))
}

/// POST /account/password (gated)
pub async fn handle_change_password(
    req: HttpRequest,
    state: AppState,
    user_id: i64,
) -> Result<HttpResponse> {
    let form = parse_form(req.body());
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    let confirm = form
        .get("confirm_password")
        .map(String::as_str)
        .unwrap_or_default();

    let outcome = validate_password_change(password, confirm);
    if !outcome.valid {
        warn!(
            "Password change rejected for user {}: {:?}",
            user_id,
            outcome.errors.iter().map(|e| e.to_code()).collect::<Vec<_>>()
        );
        return deliver_html(
            StatusCode::BAD_REQUEST,
            views::password_page(&outcome.messages()),
            None,
        );
    }

    let hash = hash_password(password)?;
    users::update_password_hash(&state.db, user_id, &hash)
        .await
        .context("Failed to update password")?;

    info!("User {} changed password", user_id);
    deliver_redirect("/account")
}
