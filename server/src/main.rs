use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gamereviews::AppState;
use gamereviews::catalog::GameCatalog;
use gamereviews::database;
use gamereviews::handlers::http::routes::build_router;
use gamereviews::serve::{ConnectionLimits, serve};
use gamereviews::session::CookieCodec;
use shared::config::{LiveConfig, load_config};

#[derive(Debug, Parser)]
#[command(name = "gamereviews", about = "Game browsing, rating and commenting server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "GAMEREVIEWS_CONFIG", default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let app_config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    let pool = database::open_pool(&app_config.database.url, app_config.database.max_connections)
        .await?;
    database::create_tables(&pool)
        .await
        .context("Failed to initialise database schema")?;

    let cookies = CookieCodec::from_config(&app_config.auth)?;
    let catalog = GameCatalog::from_config(&app_config.catalog)?;
    if app_config.catalog.resolved_api_key().is_none() {
        warn!("No catalog API key configured (RAWG_API_KEY); catalog requests may be refused");
    }

    let addr: SocketAddr = app_config
        .server
        .addr()
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.addr()))?;
    let limits = ConnectionLimits {
        max_connections: app_config.server.max_connections,
        request_timeout: Duration::from_secs(app_config.server.request_timeout_secs),
    };

    let live_config = LiveConfig::new(app_config);
    let state = AppState::new(pool, live_config.clone(), cookies, catalog);
    let router = Arc::new(build_router());

    spawn_reload_task(cli.config.clone(), live_config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    serve(listener, state.clone(), router, limits, async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Cannot listen for ctrl-c, shutting down: {}", e),
        }
    })
    .await?;

    state.db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Re-read the config file on SIGHUP. A file that fails to load or
/// validate leaves the running config untouched.
#[cfg(unix)]
fn spawn_reload_task(path: String, live: LiveConfig) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Cannot listen for SIGHUP, config reload disabled: {}", e);
                return;
            }
        };

        while hangups.recv().await.is_some() {
            match live.reload_from(&path).await {
                Ok(()) => info!("Configuration reloaded from {}", path),
                Err(e) => error!("Config reload failed, keeping current config: {}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_task(_path: String, _live: LiveConfig) {}
