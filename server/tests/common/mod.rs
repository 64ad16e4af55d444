//! Helpers shared by the integration tests: a throwaway database, an
//! `AppState` around it, and a tiny cookie jar for driving the router.
#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use hyper::{Request, StatusCode};
use sqlx::SqlitePool;
use tempfile::TempDir;

use gamereviews::AppState;
use gamereviews::catalog::GameCatalog;
use gamereviews::database::{self, users, utils::hash_password};
use gamereviews::handlers::http::HttpResponse;
use gamereviews::handlers::http::routes::{Router, build_router};
use gamereviews::session::CookieCodec;
use shared::config::{LiveConfig, parse_config};

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const COOKIE_NAME: &str = "gameReviews";

const CONFIG: &str = r#"
[server]
bind = "127.0.0.1"
port = 0

[paths]
web_dir = "web"

[database]
url = "sqlite::memory:"

[auth]
cookie_secret = "integration-test-secret-0123456789abcdef"

[catalog]
base_url = "http://127.0.0.1:9"
timeout_secs = 1
"#;

/// A file-backed database that lives as long as the returned `TempDir`.
pub async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = database::open_pool(&url, 1).await.unwrap();
    database::create_tables(&pool).await.unwrap();
    (pool, dir)
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub codec: CookieCodec,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let (pool, dir) = test_pool().await;
        let config = parse_config(CONFIG).unwrap();
        let catalog = GameCatalog::from_config(&config.catalog).unwrap();
        let state = AppState::new(
            pool,
            LiveConfig::new(config),
            CookieCodec::new(COOKIE_NAME, SECRET, false),
            catalog,
        );

        Self {
            state,
            router: build_router(),
            codec: CookieCodec::new(COOKIE_NAME, SECRET, false),
            _dir: dir,
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> HttpResponse {
        self.send("GET", path, cookie, "").await
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>, form: &str) -> HttpResponse {
        self.send("POST", path, cookie, form).await
    }

    async fn send(&self, method: &str, path: &str, cookie: Option<&str>, form: &str) -> HttpResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if !form.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        if let Some(pair) = cookie {
            builder = builder.header(COOKIE, pair);
        }
        let req = builder.body(Full::new(Bytes::from(form.to_string()))).unwrap();

        match self.router.handle(req, self.state.clone()).await {
            Ok(res) => res,
            Err(never) => match never {},
        }
    }

    /// Store a user directly, skipping the registration flow.
    pub async fn seed_user(&self, username: &str, email: &str, password: &str) -> i64 {
        let hash = hash_password(password).unwrap();
        users::create_user(self.db(), username, email, &hash).await.unwrap()
    }

    /// Log in through `POST /login` and return the `name=value` cookie pair.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .post("/login", None, &form(&[("email", email), ("password", password)]))
            .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/");
        cookie_pair(&res).expect("login sets a cookie")
    }
}

pub fn form(fields: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

pub fn location(res: &HttpResponse) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn set_cookie(res: &HttpResponse) -> Option<String> {
    res.headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The `name=value` part of `Set-Cookie`, as a browser would send it back.
pub fn cookie_pair(res: &HttpResponse) -> Option<String> {
    set_cookie(res).and_then(|c| c.split(';').next().map(str::to_string))
}

pub fn clears_cookie(res: &HttpResponse) -> bool {
    set_cookie(res).is_some_and(|c| c.starts_with(&format!("{}=;", COOKIE_NAME)) && c.contains("Max-Age=0"))
}

pub async fn body_text(res: HttpResponse) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
