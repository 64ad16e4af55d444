use anyhow::Result;
use tracing::warn;

use crate::AppState;
use crate::database::{ratings, sessions, users};
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};

/// GET /account (gated)
pub async fn handle_account(_req: HttpRequest, state: AppState, user_id: i64) -> Result<HttpResponse> {
    match users::find_user_by_id(&state.db, user_id).await? {
        Some(user) => {
            let expires = sessions::find_session_by_user(&state.db, user_id)
                .await?
                .map(|s| s.expires);
            deliver_page(views::account_page(&user, expires))
        }
        None => {
            warn!("Valid session for missing user {}", user_id);
            deliver_redirect_with_cookie("/login", Some(state.cookies.clear_header()?))
        }
    }
}

/// GET /account/reviewed (gated)
pub async fn handle_reviewed(_req: HttpRequest, state: AppState, user_id: i64) -> Result<HttpResponse> {
    let reviewed = ratings::reviewed_by_user(&state.db, user_id).await?;
    deliver_page(views::reviewed_page(&reviewed))
}
