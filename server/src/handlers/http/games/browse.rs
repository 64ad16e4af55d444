use anyhow::Result;

use crate::AppState;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, views};

/// GET /
pub async fn handle_index(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let signed_in = state.envelope(req.headers()).user_id().is_some();
    let games = state.catalog.trending().await?;
    deliver_page(views::index_page(&games, signed_in))
}

/// GET /search?query=
pub async fn handle_search(req: HttpRequest, state: AppState) -> Result<HttpResponse> {
    let signed_in = state.envelope(req.headers()).user_id().is_some();
    let query = query_params(req.uri())
        .remove("query")
        .unwrap_or_default();

    let games = state.catalog.search(&query).await?;
    deliver_page(views::search_page(&query, &games, signed_in))
}
