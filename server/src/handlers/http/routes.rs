use std::convert::Infallible;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::{Method, Request, StatusCode};
use tracing::{debug, error, warn};

use crate::AppState;
use crate::handlers::http::utils::*;
use crate::handlers::http::{HttpRequest, HttpResponse, account, auth, games};
use crate::session::{self, AuthState, SessionEnvelope};

/// Request bodies are forms; anything larger is rejected unread.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Two tiers:
//
//   OpenHandler:  no auth.  Receives (req, state).
//                   Use for: public pages, /login, /register, /logout, /health.
//
//   GatedHandler: session cookie checked against the session store on
//                   every request.  Receives (req, state, user_id).
//                   Use for: anything that needs a signed-in user.

type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send>>;

type OpenHandler = Box<dyn Fn(HttpRequest, AppState) -> HandlerFuture + Send + Sync>;

type GatedHandler = Box<
    dyn Fn(
            HttpRequest,
            AppState,
            i64, // user_id, verified by the router
        ) -> HandlerFuture
        + Send
        + Sync,
>;

enum RouteKind {
    Open(OpenHandler),

    /// The router runs the session gate first. On failure the visitor is
    /// sent to `/login` with the cookie cleared and the handler never runs.
    Gated(GatedHandler),
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    fn gated<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState, i64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Gated(Box::new(move |req, state, uid| {
                Box::pin(handler(req, state, uid))
            })),
        });
        self
    }

    // ── Open (no auth) ────────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    // ── Gated (session cookie + session store) ───────────────────────────────
    //
    // Handlers receive the verified `user_id` and must NOT repeat the check.

    pub fn get_gated<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState, i64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.gated(Method::GET, path, handler)
    }

    pub fn post_gated<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, AppState, i64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.gated(Method::POST, path, handler)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Entry point for the server: never fails. Handler errors are logged and
    /// answered with a 500 page.
    pub async fn handle<B>(&self, req: Request<B>, state: AppState) -> Result<HttpResponse, Infallible>
    where
        B: hyper::body::Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.route(req, state).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("{} {} failed: {:#}", method, path, e);
                Ok(internal_error())
            }
        }
    }

    pub async fn route<B>(&self, req: Request<B>, state: AppState) -> Result<HttpResponse>
    where
        B: hyper::body::Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Rejected request body for {}: {}", parts.uri.path(), e);
                return deliver_error_page(StatusCode::BAD_REQUEST, "The request could not be read.");
            }
        };
        let req = Request::from_parts(parts, body);

        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for route in &self.routes {
            if route.method != method || !Self::path_matches(&route.path, &path) {
                continue;
            }

            return match &route.kind {
                RouteKind::Open(h) => h(req, state).await,

                RouteKind::Gated(h) => {
                    let envelope = SessionEnvelope::from_headers(req.headers(), &state.cookies);
                    match session::gate(&state.db, &envelope).await? {
                        AuthState::Authenticated { user_id } => h(req, state, user_id).await,
                        rejected => {
                            warn!("Gate rejected {} {}: {:?}", method, path, rejected);
                            deliver_redirect_with_cookie(
                                "/login",
                                Some(state.cookies.clear_header()?),
                            )
                        }
                    }
                }
            };
        }

        if method == Method::GET && path.starts_with("/static/") {
            let web_dir = PathBuf::from(&state.config.read().await.paths.web_dir);
            return deliver_static_file(&web_dir, &path)
                .await
                .context("Failed to deliver static file");
        }

        debug!("No route for {} {}", method, path);
        deliver_not_found()
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Strip query string from incoming request path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);

        if route_path == clean {
            return true;
        }

        // Segment-by-segment matching for `:param` wildcards.
        // e.g.  "/game/:id/comments"  matches  "/game/3498/comments"
        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
    }
}

// ---------------------------------------------------------------------------
// Application router
//
// Auth is enforced here at the routing level; handlers MUST NOT repeat it.
//
//   .get(...) / .post(...)              → Open:  handler gets (req, state)
//   .get_gated(...) / .post_gated(...)  → Gated: handler gets (req, state, user_id)
// ---------------------------------------------------------------------------

pub fn build_router() -> Router {
    Router::new()
        // ── Public ───────────────────────────────────────────────────────────
        .get("/health", |_req, _state| async move {
            deliver_json(
                &serde_json::json!({"status": "success", "health": "ok"}),
                StatusCode::OK,
            )
        })
        .get("/", |req, state| async move {
            games::handle_index(req, state).await.context("Index failed")
        })
        .get("/search", |req, state| async move {
            games::handle_search(req, state).await.context("Search failed")
        })
        .get("/game/:id", |req, state| async move {
            games::handle_game(req, state).await.context("Game page failed")
        })
        .get("/game/:id/comments", |req, state| async move {
            games::handle_comments(req, state)
                .await
                .context("Comments page failed")
        })
        // ── Auth ─────────────────────────────────────────────────────────────
        .get("/login", |req, state| async move {
            auth::handle_login_page(req, state).await.context("Login page failed")
        })
        .post("/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .post("/logout", |req, state| async move {
            auth::handle_logout(req, state).await.context("Logout failed")
        })
        .get("/register", |req, state| async move {
            auth::handle_register_page(req, state)
                .await
                .context("Register page failed")
        })
        .post("/register", |req, state| async move {
            auth::handle_register(req, state).await.context("Register failed")
        })
        // ── Gated ────────────────────────────────────────────────────────────
        .post_gated("/game/:id", |req, state, user_id| async move {
            games::handle_rate(req, state, user_id)
                .await
                .context("Rating failed")
        })
        .post_gated("/game/:id/comments", |req, state, user_id| async move {
            games::handle_post_comment(req, state, user_id)
                .await
                .context("Comment failed")
        })
        .get_gated("/account", |req, state, user_id| async move {
            account::handle_account(req, state, user_id)
                .await
                .context("Account page failed")
        })
        .get_gated("/account/username", |req, state, user_id| async move {
            account::handle_username_page(req, state, user_id)
                .await
                .context("Username page failed")
        })
        .post_gated("/account/username", |req, state, user_id| async move {
            account::handle_change_username(req, state, user_id)
                .await
                .context("Username change failed")
        })
        .get_gated("/account/password", |req, state, user_id| async move {
            account::handle_password_page(req, state, user_id)
                .await
                .context("Password page failed")
        })
        .post_gated("/account/password", |req, state, user_id| async move {
            account::handle_change_password(req, state, user_id)
                .await
                .context("Password change failed")
        })
        .get_gated("/account/reviewed", |req, state, user_id| async move {
            account::handle_reviewed(req, state, user_id)
                .await
                .context("Reviewed page failed")
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
