//! GameReviews server: catalog browsing, ratings and comments behind a
//! cookie session that is re-checked against the session store on every
//! gated request.

use std::sync::Arc;

use hyper::header::HeaderMap;
use sqlx::SqlitePool;

use shared::config::LiveConfig;

pub mod catalog;
pub mod database;
pub mod handlers;
pub mod serve;
pub mod session;
pub mod tower_middle;

use catalog::GameCatalog;
use session::{CookieCodec, SessionEnvelope};

/// Everything a handler needs, built once in `main` and cloned per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: LiveConfig,
    /// Built from the startup config; a reload does not rotate the secret.
    pub cookies: Arc<CookieCodec>,
    pub catalog: Arc<GameCatalog>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: LiveConfig,
        cookies: CookieCodec,
        catalog: GameCatalog,
    ) -> Self {
        Self {
            db,
            config,
            cookies: Arc::new(cookies),
            catalog: Arc::new(catalog),
        }
    }

    /// Decode the request's session cookie; anything unusable is empty.
    pub fn envelope(&self, headers: &HeaderMap) -> SessionEnvelope {
        SessionEnvelope::from_headers(headers, &self.cookies)
    }
}
