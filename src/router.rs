use std::collections::HashMap;

use thiserror::Error;
use tracing::{error, info, warn};
use url::form_urlencoded;

use crate::archive::{ArchiveClient, CannedArchive, StreamSource};
use crate::config::{ArchiveMode, Config};
use crate::host::{Host, Notice};
use crate::menu::Menu;
use crate::region::RegionBypass;
use crate::tmdb::{CannedCatalog, Catalog, MediaKind, TmdbClient, TmdbError};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("{action} is missing parameter {param}")]
    MissingParam {
        action: &'static str,
        param: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RootMenu,
    ListMovies,
    ListTvShows,
    ListItems {
        category: String,
        subcategory: String,
    },
    ResolveItem {
        item_id: String,
        item_type: String,
        title: String,
    },
    Unknown(String),
}

/// Decode a plugin query string. A leading `?` is ignored and later
/// duplicates of a key win.
pub fn parse_params(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

impl Action {
    pub fn parse(query: &str) -> Result<Self, RouteError> {
        let mut params = parse_params(query);

        let Some(action) = params.remove("action").filter(|a| !a.is_empty()) else {
            return Ok(Action::RootMenu);
        };

        let mut take = |name: &'static str, param: &'static str| {
            params
                .remove(param)
                .filter(|v| !v.is_empty())
                .ok_or(RouteError::MissingParam {
                    action: name,
                    param,
                })
        };

        Ok(match action.as_str() {
            "list_movies" => Action::ListMovies,
            "list_tvshows" => Action::ListTvShows,
            "list_items" => Action::ListItems {
                category: take("list_items", "category")?,
                subcategory: take("list_items", "subcategory")?,
            },
            "resolve_item" => Action::ResolveItem {
                item_id: take("resolve_item", "item_id")?,
                item_type: take("resolve_item", "item_type")?,
                title: take("resolve_item", "title")?,
            },
            _ => Action::Unknown(action),
        })
    }
}

/// Dispatches one plugin invocation to its handler
pub struct Router {
    addon_name: String,
    menu: Menu,
    catalog: Box<dyn Catalog>,
    streams: Box<dyn StreamSource>,
    bypass: RegionBypass,
}

impl Router {
    pub fn new(
        addon_name: &str,
        menu: Menu,
        catalog: Box<dyn Catalog>,
        streams: Box<dyn StreamSource>,
        bypass: RegionBypass,
    ) -> Self {
        Self {
            addon_name: addon_name.to_string(),
            menu,
            catalog,
            streams,
            bypass,
        }
    }

    /// Wire up the catalog and stream backends described by `config`.
    /// Without a TMDB key the canned catalog is used.
    pub fn from_config(config: &Config, plugin_url: &str) -> Self {
        let tmdb = config.tmdb();
        let menu = Menu::new(plugin_url, &config.addon.id, &tmdb.image_base_url);

        let catalog: Box<dyn Catalog> =
            match TmdbClient::with_base_url(tmdb.apikey.as_deref(), &tmdb.base_url) {
                Some(client) => Box::new(client),
                None => {
                    info!("no TMDB API key, using canned catalog");
                    Box::new(CannedCatalog)
                }
            };

        let streams: Box<dyn StreamSource> = match config.archive.mode {
            ArchiveMode::Canned => Box::new(CannedArchive),
            ArchiveMode::Live => {
                Box::new(ArchiveClient::with_base_url(&config.archive.base_url))
            }
        };

        Self::new(
            &config.addon.name,
            menu,
            catalog,
            streams,
            config.region.bypass(),
        )
    }

    pub async fn route<H: Host>(&self, host: &mut H, query: &str) {
        let action = match Action::parse(query) {
            Ok(action) => action,
            Err(e) => {
                warn!(error = %e, query, "ignoring request");
                return;
            }
        };

        info!(?action, catalog = self.catalog.name(), "routing");

        match action {
            Action::RootMenu => {
                for item in self.menu.root() {
                    host.add_directory_item(item);
                }
                host.end_of_directory();
            }
            Action::ListMovies => self.list_categories(host, MediaKind::Movie),
            Action::ListTvShows => self.list_categories(host, MediaKind::TvShow),
            Action::ListItems {
                category,
                subcategory,
            } => self.list_items(host, &category, &subcategory).await,
            Action::ResolveItem {
                item_id,
                item_type,
                title,
            } => self.resolve_item(host, &item_id, &item_type, &title).await,
            Action::Unknown(name) => {
                warn!(action = %name, "unknown action");
                host.notify(Notice::error(
                    &self.addon_name,
                    format!("Unknown action: {}", name),
                ));
            }
        }
    }

    fn list_categories<H: Host>(&self, host: &mut H, kind: MediaKind) {
        for item in self.menu.categories(kind) {
            host.add_directory_item(item);
        }
        host.end_of_directory();
    }

    async fn list_items<H: Host>(&self, host: &mut H, category: &str, subcategory: &str) {
        info!(category, subcategory, "listing items");

        let Some(kind) = MediaKind::from_category(category) else {
            warn!(category, "unknown category");
            host.end_of_directory();
            return;
        };

        let listing = match (subcategory, kind) {
            ("popular", _) => self.catalog.popular(kind).await,
            ("trending", _) => self.catalog.trending(kind).await,
            ("intheatres", MediaKind::Movie) => self.catalog.in_theaters().await,
            ("airingtoday", MediaKind::TvShow) => self.catalog.airing_today().await,
            _ => Err(TmdbError::Unsupported("subcategory")),
        };

        match listing {
            Ok(items) => {
                for item in &items {
                    host.add_directory_item(self.menu.catalog_entry(item, kind));
                }
            }
            Err(TmdbError::Unsupported(_)) => {
                host.add_directory_item(self.menu.placeholder(subcategory, kind));
            }
            Err(e) => {
                error!(error = %e, category, subcategory, "catalog request failed");
                host.notify(Notice::error(
                    &self.addon_name,
                    format!("Failed to load {}: {}", kind.label(), e),
                ));
            }
        }

        host.end_of_directory();
    }

    async fn resolve_item<H: Host>(
        &self,
        host: &mut H,
        item_id: &str,
        item_type: &str,
        title: &str,
    ) {
        info!(item_id, item_type, title, "resolving stream");

        let stream_url = match self.streams.resolve_stream_url(title).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, title, source = self.streams.name(), "stream lookup failed");
                None
            }
        };

        match stream_url {
            Some(url) => {
                let url = self.bypass.unblocked_url(&url);
                info!(url = %url, "stream found");
                host.set_resolved_url(Some(url));
            }
            None => {
                warn!(title, "no stream found");
                host.notify(Notice::info(
                    &self.addon_name,
                    format!("No stream found for {}.", title),
                ));
                host.set_resolved_url(None);
            }
        }
    }
}
