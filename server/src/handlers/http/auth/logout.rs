use anyhow::Result;
use tracing::{error, info};

use crate::AppState;
use crate::database::sessions;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse};

/// POST /logout
///
/// Always clears the cookie and redirects home. Invalidation is best effort:
/// an unknown token or a store failure still logs the visitor out.
pub async fn handle_logout(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let envelope = state.envelope(req.headers());

    if let Some(token) = envelope.token() {
        match sessions::invalidate_by_token(&state.db, token).await {
            Ok(true) => info!("Session invalidated for user {:?}", envelope.user_id()),
            Ok(false) => info!("Logout with a token that matches no session"),
            Err(e) => error!("Failed to invalidate session on logout: {}", e),
        }
    }

    deliver_redirect_with_cookie("/", Some(state.cookies.clear_header()?))
}
