use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// At compile time, set TMDB_API_KEY env var to embed it, otherwise users must provide in config
const EMBEDDED_API_KEY: Option<&str> = option_env!("TMDB_API_KEY");

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("{0} listing not supported by this catalog")]
    Unsupported(&'static str),
}

/// Movie or TV show. Controls the TMDB path segment and the router's
/// `category` / `item_type` parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    TvShow,
}

impl MediaKind {
    /// Path segment used by the TMDB API
    pub fn api_segment(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::TvShow => "tv",
        }
    }

    /// Value of the `item_type` parameter and the `mediatype` info label
    pub fn item_type(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::TvShow => "tvshow",
        }
    }

    /// Value of the `category` parameter
    pub fn category(self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::TvShow => "tvshows",
        }
    }

    pub fn from_category(category: &str) -> Option<Self> {
        match category {
            "movies" => Some(MediaKind::Movie),
            "tvshows" => Some(MediaKind::TvShow),
            _ => None,
        }
    }

    /// Plural label used in placeholder entries
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Movie => "Movies",
            MediaKind::TvShow => "TV Shows",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub title: Option<String>, // Movies
    pub name: Option<String>,  // TV shows
    pub overview: Option<String>,
    pub release_date: Option<String>,   // Movies
    pub first_air_date: Option<String>, // TV shows
    pub poster_path: Option<String>,
}

impl CatalogItem {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn year(&self) -> Option<u16> {
        let date = self
            .release_date
            .as_deref()
            .or(self.first_air_date.as_deref())?;
        date.split('-').next()?.parse().ok()
    }

    /// Image base joined with the poster path; an absent path joins as empty.
    pub fn poster_url(&self, image_base_url: &str) -> String {
        format!(
            "{}{}",
            image_base_url,
            self.poster_path.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<CatalogItem>,
}

/// Source of catalog listings for the menus
#[async_trait]
pub trait Catalog: Send + Sync {
    fn name(&self) -> &str;

    async fn popular(&self, kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError>;

    async fn trending(&self, _kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError> {
        Err(TmdbError::Unsupported("trending"))
    }

    async fn in_theaters(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        Err(TmdbError::Unsupported("in theaters"))
    }

    async fn airing_today(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        Err(TmdbError::Unsupported("airing today"))
    }
}

pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    /// Uses the custom key if provided, otherwise the embedded one.
    /// Returns None if no API key is available.
    pub fn with_base_url(custom_api_key: Option<&str>, base_url: &str) -> Option<Self> {
        let api_key = custom_api_key
            .map(String::from)
            .or_else(|| EMBEDDED_API_KEY.map(String::from))?;

        Some(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_list(&self, endpoint: &str) -> Result<Vec<CatalogItem>, TmdbError> {
        let url = format!("{}/3/{}", self.base_url, endpoint);

        debug!(url = %url, "requesting TMDB");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TmdbError::Status(response.status()));
        }

        let list: ListResponse = response.json().await?;
        Ok(list.results)
    }

    /// Get popular movies
    pub async fn get_popular_movies(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.fetch_list("movie/popular").await
    }

    /// Get popular TV shows
    pub async fn get_popular_tv(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.fetch_list("tv/popular").await
    }

    /// Get this week's trending movies or shows
    pub async fn get_trending(&self, kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError> {
        self.fetch_list(&format!("trending/{}/week", kind.api_segment()))
            .await
    }

    /// Get movies currently in theaters
    pub async fn get_now_playing(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.fetch_list("movie/now_playing").await
    }

    /// Get shows airing today
    pub async fn get_airing_today(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.fetch_list("tv/airing_today").await
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn popular(&self, kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError> {
        match kind {
            MediaKind::Movie => self.get_popular_movies().await,
            MediaKind::TvShow => self.get_popular_tv().await,
        }
    }

    async fn trending(&self, kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError> {
        self.get_trending(kind).await
    }

    async fn in_theaters(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.get_now_playing().await
    }

    async fn airing_today(&self) -> Result<Vec<CatalogItem>, TmdbError> {
        self.get_airing_today().await
    }
}

/// Fixed catalog used when no TMDB key is available
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedCatalog;

impl CannedCatalog {
    pub fn movies() -> Vec<CatalogItem> {
        vec![
            canned_movie(
                1,
                "Public Domain Movie 1",
                "1950-01-01",
                "A classic public domain film.",
                "/mock_poster1.jpg",
            ),
            canned_movie(
                2,
                "Public Domain Movie 2",
                "1960-05-15",
                "Another great public domain feature.",
                "/mock_poster2.jpg",
            ),
        ]
    }

    pub fn tv_shows() -> Vec<CatalogItem> {
        vec![CatalogItem {
            id: 101,
            title: None,
            name: Some("Public Domain Show 1".to_string()),
            overview: Some("A classic public domain TV series.".to_string()),
            release_date: None,
            first_air_date: Some("1955-01-01".to_string()),
            poster_path: Some("/mock_tvposter1.jpg".to_string()),
        }]
    }
}

fn canned_movie(id: u64, title: &str, date: &str, overview: &str, poster: &str) -> CatalogItem {
    CatalogItem {
        id,
        title: Some(title.to_string()),
        name: None,
        overview: Some(overview.to_string()),
        release_date: Some(date.to_string()),
        first_air_date: None,
        poster_path: Some(poster.to_string()),
    }
}

#[async_trait]
impl Catalog for CannedCatalog {
    fn name(&self) -> &str {
        "canned"
    }

    async fn popular(&self, kind: MediaKind) -> Result<Vec<CatalogItem>, TmdbError> {
        debug!(kind = kind.api_segment(), "serving canned popular listing");
        Ok(match kind {
            MediaKind::Movie => Self::movies(),
            MediaKind::TvShow => Self::tv_shows(),
        })
    }
}
