use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    parse_config(&contents)
}

/// Parse and validate a TOML document. Split out of [`load_config`] so
/// callers holding the text already (tests, embedded defaults) skip the disk.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(contents)?;

    info!("Configuration loaded successfully");

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.web_dir.is_empty() {
        return Err(ConfigError::InvalidConfig("web_dir cannot be empty".into()));
    }

    if config.database.url.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "database.url cannot be empty".into(),
        ));
    }

    if config.auth.session_days <= 0 {
        return Err(ConfigError::InvalidConfig(
            "session_days must be greater than 0".into(),
        ));
    }

    if config.auth.cookie_name.is_empty()
        || !config
            .auth
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::InvalidConfig(
            "cookie_name must be non-empty and contain only [A-Za-z0-9_-]".into(),
        ));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.catalog.page_size == 0 || config.catalog.page_size > 40 {
        return Err(ConfigError::InvalidConfig(
            "catalog.page_size must be between 1 and 40".into(),
        ));
    }

    // Checked here so a bad secret is rejected at startup and on SIGHUP
    // reloads instead of at the first login.
    match config.auth.resolved_cookie_secret() {
        None => {
            return Err(ConfigError::InvalidConfig(
                "cookie_secret must be set via the COOKIE_SECRET env var or auth.cookie_secret config field"
                    .into(),
            ));
        }
        Some(secret) if secret.len() < 32 => {
            return Err(ConfigError::InvalidConfig(
                "cookie_secret must be at least 32 characters long".into(),
            ));
        }
        _ => {}
    }

    Ok(())
}
