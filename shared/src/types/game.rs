use serde::Deserialize;

// Only the catalog fields the pages render. Everything else in the
// upstream JSON is ignored by serde.

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformEntry {
    pub platform: NamedRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub metacritic: Option<i64>,
    #[serde(default)]
    pub platforms: Option<Vec<PlatformEntry>>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
}

impl GameSummary {
    pub fn platform_names(&self) -> Vec<&str> {
        self.platforms
            .iter()
            .flatten()
            .map(|p| p.platform.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameDetail {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub metacritic: Option<i64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub publishers: Vec<NamedRef>,
    #[serde(default)]
    pub tags: Vec<NamedRef>,
}

/// Envelope of the catalog's paged list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GameList {
    #[serde(default)]
    pub results: Vec<GameSummary>,
}
