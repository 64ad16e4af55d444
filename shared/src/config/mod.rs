pub mod config;

pub use self::config::{load_config, parse_config};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::server_config::{AppConfig, ConfigError};

/// A cheaply-cloneable, live config handle.
///
/// Every clone shares one `RwLock<AppConfig>`, so [`LiveConfig::reload`]
/// is visible to all request handlers on their next read.
///
/// ```rust,no_run
/// // let days = state.config.read().await.auth.session_days;
/// // state.config.reload(new_app_config).await;
/// ```
#[derive(Clone, Debug)]
pub struct LiveConfig(Arc<RwLock<AppConfig>>);

impl LiveConfig {
    pub fn new(config: AppConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    /// Acquire a read guard. Keep it short-lived; never hold across `.await`.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.0.read().await
    }

    /// Swap in a new config.
    pub async fn reload(&self, new: AppConfig) {
        *self.0.write().await = new;
    }

    /// Load and validate `path`, swapping only if that succeeds. On error
    /// the running config is left as it was.
    pub async fn reload_from(&self, path: &str) -> Result<(), ConfigError> {
        let new = load_config(path)?;
        self.reload(new).await;
        Ok(())
    }
}
