use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub web_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://gamereviews.db`.
    pub url: String,
    #[serde(default = "default_db_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Lifetime of a login, both the cookie and the stored session record.
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Adds `Secure` to the session cookie. Leave off for plain-HTTP dev servers.
    #[serde(default)]
    pub secure_cookies: bool,
    /// HMAC key used to sign the session cookie.
    ///
    /// Prefer loading this via the `COOKIE_SECRET` environment variable.
    ///
    /// **Minimum length:** 32 characters.
    /// **Hot-reload safe:** NO. The codec is built once at startup; rotating
    /// the key signs every visitor out.
    pub cookie_secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    /// Falls back to the `RAWG_API_KEY` environment variable.
    pub api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"0.0.0.0:3000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl AuthConfig {
    /// Resolve the cookie secret with `COOKIE_SECRET` taking priority over
    /// the config file field.
    pub fn resolved_cookie_secret(&self) -> Option<String> {
        std::env::var("COOKIE_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.cookie_secret.clone())
            .filter(|s| !s.is_empty())
    }
}

impl CatalogConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("RAWG_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_port() -> u16 {
    3000
}

pub fn default_max_connections() -> usize {
    1000
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_db_connections() -> u32 {
    5
}

pub fn default_session_days() -> i64 {
    30
}

pub fn default_cookie_name() -> String {
    "gameReviews".to_string()
}

pub fn default_catalog_url() -> String {
    "https://api.rawg.io/api".to_string()
}

pub fn default_page_size() -> u32 {
    12
}

pub fn default_catalog_timeout() -> u64 {
    10
}
