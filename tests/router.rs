mod common;

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use penguinsurf::archive::{ArchiveError, CannedArchive, StreamSource};
use penguinsurf::config::Config;
use common::RecordingHost;
use penguinsurf::host::NoticeLevel;
use penguinsurf::menu::Menu;
use penguinsurf::region::RegionBypass;
use penguinsurf::router::Router;
use penguinsurf::tmdb::{CannedCatalog, IMAGE_BASE_URL, TmdbClient};

const PLUGIN_URL: &str = "plugin://plugin.video.penguinsurf/";

fn menu() -> Menu {
    Menu::new(PLUGIN_URL, "plugin.video.penguinsurf", IMAGE_BASE_URL)
}

fn canned_router() -> Router {
    Router::new(
        "PenguinSurf",
        menu(),
        Box::new(CannedCatalog),
        Box::new(CannedArchive),
        RegionBypass::default(),
    )
}

async fn route(router: &Router, query: &str) -> RecordingHost {
    let mut host = RecordingHost::default();
    router.route(&mut host, query).await;
    host
}

/// Always finds a stream on the geo-restricted host
struct RestrictedSource;

#[async_trait]
impl StreamSource for RestrictedSource {
    fn name(&self) -> &str {
        "restricted"
    }

    async fn search(&self, title: &str) -> Result<Option<String>, ArchiveError> {
        Ok(Some(format!("https://geo-restricted.example.com/details/{}", title)))
    }

    async fn resolve(&self, _item_page_url: &str) -> Result<Option<String>, ArchiveError> {
        Ok(Some(
            "https://geo-restricted.example.com/download/film.mp4".to_string(),
        ))
    }
}

/// Fails every lookup
struct BrokenSource;

#[async_trait]
impl StreamSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    async fn search(&self, _title: &str) -> Result<Option<String>, ArchiveError> {
        Err(ArchiveError::InvalidResponse("status: 503".to_string()))
    }

    async fn resolve(&self, _item_page_url: &str) -> Result<Option<String>, ArchiveError> {
        unreachable!("search never succeeds")
    }
}

#[tokio::test]
async fn test_root_menu() {
    let host = route(&canned_router(), "").await;

    assert_eq!(host.labels(), ["Movies", "TV Shows", "Settings"]);
    assert_eq!(host.directories_ended, 1);
    assert!(host.notices.is_empty());
}

#[tokio::test]
async fn test_blank_action_shows_root_menu() {
    let host = route(&canned_router(), "?action=").await;

    assert_eq!(host.labels(), ["Movies", "TV Shows", "Settings"]);
    assert_eq!(host.directories_ended, 1);
    assert!(host.notices.is_empty());
}

#[tokio::test]
async fn test_list_movies_and_tvshows() {
    let router = canned_router();

    let host = route(&router, "?action=list_movies").await;
    assert_eq!(
        host.labels(),
        ["Popular Movies", "Trending Movies", "In Theaters", "Genres"]
    );
    assert_eq!(host.directories_ended, 1);

    let host = route(&router, "?action=list_tvshows").await;
    assert_eq!(
        host.labels(),
        ["Popular TV Shows", "Trending TV Shows", "Airing Today", "Genres"]
    );
}

#[tokio::test]
async fn test_popular_movies_listing() {
    let host = route(
        &canned_router(),
        "?action=list_items&category=movies&subcategory=popular",
    )
    .await;

    assert_eq!(
        host.labels(),
        ["Public Domain Movie 1", "Public Domain Movie 2"]
    );
    assert!(host.items.iter().all(|i| !i.is_folder));
    assert!(host.items.iter().all(|i| i.playable == Some(true)));
    assert_eq!(
        host.items[1].url,
        "plugin://plugin.video.penguinsurf/?action=resolve_item&item_id=2&item_type=movie&title=Public+Domain+Movie+2"
    );
    assert_eq!(host.directories_ended, 1);
}

#[tokio::test]
async fn test_popular_tvshows_listing() {
    let host = route(
        &canned_router(),
        "?action=list_items&category=tvshows&subcategory=popular",
    )
    .await;

    assert_eq!(host.labels(), ["Public Domain Show 1"]);
    let info = host.items[0].info.as_ref().unwrap();
    assert_eq!(info.mediatype, "tvshow");
    assert_eq!(info.year, Some(1955));
    assert!(host.items[0].url.contains("item_type=tvshow"));
}

#[tokio::test]
async fn test_other_subcategories_show_placeholder() {
    let router = canned_router();

    let host = route(
        &router,
        "?action=list_items&category=movies&subcategory=trending",
    )
    .await;
    assert_eq!(host.labels(), ["Placeholder for trending Movies"]);
    assert_eq!(host.items[0].url, "plugin://plugin.video.penguinsurf/?");
    assert_eq!(host.directories_ended, 1);

    let host = route(
        &router,
        "?action=list_items&category=tvshows&subcategory=genres",
    )
    .await;
    assert_eq!(host.labels(), ["Placeholder for genres TV Shows"]);
}

#[tokio::test]
async fn test_unknown_category_lists_nothing() {
    let host = route(
        &canned_router(),
        "?action=list_items&category=sports&subcategory=popular",
    )
    .await;

    assert!(host.items.is_empty());
    assert_eq!(host.directories_ended, 1);
}

#[tokio::test]
async fn test_unknown_action_notifies() {
    let host = route(&canned_router(), "?action=list_sports").await;

    assert!(host.items.is_empty());
    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].level, NoticeLevel::Error);
    assert_eq!(host.notices[0].message, "Unknown action: list_sports");
    assert_eq!(host.notices[0].heading, "PenguinSurf");
}

#[tokio::test]
async fn test_missing_params_do_nothing() {
    let router = canned_router();

    assert!(route(&router, "?action=list_items&category=movies").await.is_untouched());
    assert!(
        route(&router, "?action=resolve_item&item_id=1&title=Public+Domain+Movie+1")
            .await
            .is_untouched()
    );
}

#[tokio::test]
async fn test_resolve_known_title() {
    let host = route(
        &canned_router(),
        "?action=resolve_item&item_id=1&item_type=movie&title=Public+Domain+Movie+1",
    )
    .await;

    assert_eq!(
        host.resolutions,
        [Some(
            "https://archive.org/download/mock_public_domain_movie_1/mock_movie_1.mp4".to_string()
        )]
    );
    assert!(host.notices.is_empty());
}

#[tokio::test]
async fn test_resolve_unknown_title_fails_visibly() {
    let host = route(
        &canned_router(),
        "?action=resolve_item&item_id=101&item_type=tvshow&title=Public+Domain+Show+1",
    )
    .await;

    assert_eq!(host.resolutions.len(), 1);
    assert!(host.resolutions[0].is_none());
    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].level, NoticeLevel::Info);
    assert_eq!(
        host.notices[0].message,
        "No stream found for Public Domain Show 1."
    );
    assert_eq!(host.notices[0].display_ms, 5000);
}

#[tokio::test]
async fn test_resolved_url_goes_through_region_bypass() {
    let router = Router::new(
        "PenguinSurf",
        menu(),
        Box::new(CannedCatalog),
        Box::new(RestrictedSource),
        RegionBypass::default(),
    );

    let host = route(
        &router,
        "?action=resolve_item&item_id=9&item_type=movie&title=Anything",
    )
    .await;

    assert_eq!(
        host.resolutions,
        [Some(
            "https://unblocked-proxy.example.com/download/film.mp4".to_string()
        )]
    );
}

#[tokio::test]
async fn test_stream_lookup_error_is_negative_resolution() {
    let router = Router::new(
        "PenguinSurf",
        menu(),
        Box::new(CannedCatalog),
        Box::new(BrokenSource),
        RegionBypass::default(),
    );

    let host = route(
        &router,
        "?action=resolve_item&item_id=1&item_type=movie&title=Public+Domain+Movie+1",
    )
    .await;

    assert_eq!(host.resolutions.len(), 1);
    assert!(host.resolutions[0].is_none());
    assert_eq!(host.notices.len(), 1);
}

#[tokio::test]
async fn test_catalog_failure_notifies_and_ends_directory() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/movie/popular"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = TmdbClient::with_base_url(Some("test-key"), &mock_server.uri()).unwrap();
    let router = Router::new(
        "PenguinSurf",
        menu(),
        Box::new(client),
        Box::new(CannedArchive),
        RegionBypass::default(),
    );

    let host = route(
        &router,
        "?action=list_items&category=movies&subcategory=popular",
    )
    .await;

    assert!(host.items.is_empty());
    assert_eq!(host.directories_ended, 1);
    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_live_catalog_serves_in_theaters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"results": [{"id": 3, "title": "Metropolis", "poster_path": "/m.jpg"}]}"#,
        ))
        .mount(&mock_server)
        .await;

    let config = Config::parse(&format!(
        "[tmdb]\napikey = \"test-key\"\nbase_url = \"{}\"",
        mock_server.uri()
    ))
    .unwrap();
    let router = Router::from_config(&config, PLUGIN_URL);

    let host = route(
        &router,
        "?action=list_items&category=movies&subcategory=intheatres",
    )
    .await;

    assert_eq!(host.labels(), ["Metropolis"]);
    assert_eq!(
        host.items[0].art.thumb.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/m.jpg")
    );
}
