//! Client for the RAWG-compatible game catalog API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use tracing::{debug, error};

use shared::types::server_config::CatalogConfig;
use shared::types::{GameDetail, GameList, GameSummary};

#[derive(Debug, Clone)]
pub struct GameCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
}

/// Catalog ids are numeric ids or slugs; anything else never reaches the API.
pub fn is_valid_game_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl GameCatalog {
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            page_size: config.page_size,
        })
    }

    /// `{base_url}{path}?key=…&extra…`, query values percent-encoded.
    pub fn url(&self, path: &str, extra: &[(&str, &str)]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(key) = &self.api_key {
            query.append_pair("key", key);
        }
        for (k, v) in extra {
            query.append_pair(k, v);
        }
        let query = query.finish();

        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        debug!("Catalog request: {}", self.redact(url));

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Catalog request failed: {}", e.without_url()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            error!("Catalog answered {} for {}", response.status(), self.redact(url));
            return Err(anyhow!("Catalog returned {}", response.status()));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Catalog sent an unreadable body: {}", e.without_url()))?;
        Ok(Some(body))
    }

    /// The key appears percent-encoded in the query, so that form is masked.
    fn redact(&self, url: &str) -> String {
        match &self.api_key {
            Some(key) if !key.is_empty() => {
                let encoded: String = form_urlencoded::byte_serialize(key.as_bytes()).collect();
                url.replace(&encoded, "***").replace(key.as_str(), "***")
            }
            _ => url.to_string(),
        }
    }

    /// Most recently added games, one page.
    pub async fn trending(&self) -> Result<Vec<GameSummary>> {
        let page_size = self.page_size.to_string();
        let url = self.url(
            "/games",
            &[("ordering", "-added"), ("page_size", &page_size)],
        );
        Ok(self
            .get_json::<GameList>(&url)
            .await?
            .map(|l| l.results)
            .unwrap_or_default())
    }

    /// An empty query returns nothing without calling the catalog.
    pub async fn search(&self, query: &str) -> Result<Vec<GameSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.url("/games", &[("search", query)]);
        Ok(self
            .get_json::<GameList>(&url)
            .await?
            .map(|l| l.results)
            .unwrap_or_default())
    }

    /// `None` when the catalog does not know the id.
    pub async fn game(&self, id: &str) -> Result<Option<GameDetail>> {
        if !is_valid_game_id(id) {
            return Ok(None);
        }
        let url = self.url(&format!("/games/{}", id), &[]);
        self.get_json::<GameDetail>(&url).await
    }
}
