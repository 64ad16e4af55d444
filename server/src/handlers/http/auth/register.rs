use anyhow::{Context, Result};
use hyper::StatusCode;
use tracing::{info, warn};

use shared::types::RegistrationData;

use crate::AppState;
use crate::database::{users, utils::hash_password};
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};
use crate::session::validate::validate_registration;

/// GET /register
pub async fn handle_register_page(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    if state.envelope(req.headers()).user_id().is_some() {
        return deliver_redirect("/");
    }
    deliver_page(views::register_page(&[], "", ""))
}

/// POST /register
///
/// Every broken rule is shown at once. On success the account is created
/// and the visitor is sent to log in.
pub async fn handle_register(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    if state.envelope(req.headers()).user_id().is_some() {
        return deliver_redirect("/");
    }

    let data = RegistrationData::from_form(&parse_form(req.body()));
    let outcome = validate_registration(&state.db, &data).await?;

    if !outcome.valid {
        warn!(
            "Registration rejected: {:?}",
            outcome.errors.iter().map(|e| e.to_code()).collect::<Vec<_>>()
        );
        return deliver_html(
            StatusCode::BAD_REQUEST,
            views::register_page(&outcome.messages(), &data.username, &data.email),
            None,
        );
    }

    let hash = hash_password(&data.password)?;
    let user_id = users::create_user(&state.db, &data.username, &data.email, &hash)
        .await
        .context("Failed to create user")?;

    info!("Registered user {} ({})", data.username, user_id);
    deliver_redirect("/login")
}
