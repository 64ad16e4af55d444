use anyhow::{Context, Result};
use hyper::StatusCode;
use tracing::{info, warn};

use shared::types::{CookiePayload, LoginData, LoginError};

use crate::AppState;
use crate::database::{sessions, utils::session_expiry};
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};
use crate::session::{SessionEnvelope, generate_session_token, validate_credentials};

/// GET /login
///
/// Consumes the flash message, if any, and rewrites the cookie without it.
pub async fn handle_login_page(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let mut envelope = state.envelope(req.headers());
    if envelope.user_id().is_some() {
        return deliver_redirect("/");
    }

    let error = envelope.take_error();
    let cookie = if envelope.is_dirty() {
        Some(envelope.commit(&state.cookies, None)?)
    } else {
        None
    };

    deliver_html(StatusCode::OK, views::login_page(error.as_deref()), cookie)
}

/// POST /login
pub async fn handle_login(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let params = parse_form(req.body());

    let data = match LoginData::from_form(&params) {
        Ok(data) => data,
        Err(login_error) => return reject(&state, login_error),
    };

    match validate_credentials(&state.db, &data.email, &data.password).await? {
        Some(user_id) => establish_session(&state, user_id).await,
        None => reject(&state, LoginError::InvalidCredentials),
    }
}

/// Mint a token, persist it as the user's only session, and hand the
/// browser a cookie that expires with it.
async fn establish_session(state: &AppState, user_id: i64) -> Result<HttpResponse> {
    let session_days = state.config.read().await.auth.session_days;

    let token = generate_session_token();
    let expires = session_expiry(session_days);

    sessions::upsert_session(&state.db, user_id, &token, expires)
        .await
        .context("Failed to store session")?;

    let envelope = SessionEnvelope::from_payload(CookiePayload::signed_in(user_id, token));
    let cookie = envelope.commit(&state.cookies, Some(expires))?;

    info!("User {} signed in; session expires {}", user_id, expires);
    deliver_redirect_with_cookie("/", Some(cookie))
}

/// A fresh envelope holding only the flash message; any previous identity
/// in the cookie is dropped.
fn reject(state: &AppState, login_error: LoginError) -> Result<HttpResponse> {
    warn!("Login rejected: {}", login_error.to_code());

    let mut envelope = SessionEnvelope::empty();
    envelope.flash_error(login_error.to_message());

    deliver_redirect_with_cookie("/login", Some(envelope.commit(&state.cookies, None)?))
}
