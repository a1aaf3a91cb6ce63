//! Directory listings handed to the host: the static menus, catalog entries
//! and the plugin URLs that call back into the router.

use url::form_urlencoded;

use crate::tmdb::{CatalogItem, MediaKind};

const VIDEO_ICON: &str = "DefaultVideo.png";
const ADDON_ICON: &str = "DefaultAddon.png";

const MOVIE_CATEGORIES: &[(&str, &str)] = &[
    ("Popular Movies", "popular"),
    ("Trending Movies", "trending"),
    ("In Theaters", "intheatres"),
    ("Genres", "genres"),
];

const TV_CATEGORIES: &[(&str, &str)] = &[
    ("Popular TV Shows", "popular"),
    ("Trending TV Shows", "trending"),
    ("Airing Today", "airingtoday"),
    ("Genres", "genres"),
];

/// Build a URL that calls the plugin again with `params` as its query string.
pub fn plugin_url(base: &str, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{}?{}", base, query)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Art {
    pub icon: Option<String>,
    pub thumb: Option<String>,
}

/// Info labels shown by the host for a video entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub plot: Option<String>,
    pub year: Option<u16>,
    pub mediatype: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryItem {
    pub label: String,
    pub url: String,
    pub is_folder: bool,
    pub art: Art,
    pub info: Option<VideoInfo>,
    /// Explicit `IsPlayable` property, when the entry sets one
    pub playable: Option<bool>,
}

impl DirectoryItem {
    fn folder(label: &str, url: String, icon: &str) -> Self {
        Self {
            label: label.to_string(),
            url,
            is_folder: true,
            art: Art {
                icon: Some(icon.to_string()),
                thumb: None,
            },
            info: None,
            playable: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    plugin_url: String,
    addon_id: String,
    image_base_url: String,
}

impl Menu {
    pub fn new(plugin_url: &str, addon_id: &str, image_base_url: &str) -> Self {
        Self {
            plugin_url: plugin_url.to_string(),
            addon_id: addon_id.to_string(),
            image_base_url: image_base_url.to_string(),
        }
    }

    pub fn url(&self, params: &[(&str, &str)]) -> String {
        plugin_url(&self.plugin_url, params)
    }

    pub fn root(&self) -> Vec<DirectoryItem> {
        vec![
            DirectoryItem::folder("Movies", self.url(&[("action", "list_movies")]), VIDEO_ICON),
            DirectoryItem::folder(
                "TV Shows",
                self.url(&[("action", "list_tvshows")]),
                VIDEO_ICON,
            ),
            DirectoryItem {
                label: "Settings".to_string(),
                url: format!("plugin://{}/settings", self.addon_id),
                is_folder: false,
                art: Art {
                    icon: Some(ADDON_ICON.to_string()),
                    thumb: None,
                },
                info: None,
                playable: Some(false),
            },
        ]
    }

    pub fn categories(&self, kind: MediaKind) -> Vec<DirectoryItem> {
        let categories = match kind {
            MediaKind::Movie => MOVIE_CATEGORIES,
            MediaKind::TvShow => TV_CATEGORIES,
        };

        categories
            .iter()
            .map(|&(label, slug)| {
                let url = self.url(&[
                    ("action", "list_items"),
                    ("category", kind.category()),
                    ("subcategory", slug),
                ]);
                DirectoryItem::folder(label, url, VIDEO_ICON)
            })
            .collect()
    }

    /// Playable entry that resolves its stream through `resolve_item`
    pub fn catalog_entry(&self, item: &CatalogItem, kind: MediaKind) -> DirectoryItem {
        let title = item.display_title();
        let poster = item.poster_url(&self.image_base_url);
        let id = item.id.to_string();

        DirectoryItem {
            label: title.to_string(),
            url: self.url(&[
                ("action", "resolve_item"),
                ("item_id", id.as_str()),
                ("item_type", kind.item_type()),
                ("title", title),
            ]),
            is_folder: false,
            art: Art {
                icon: Some(poster.clone()),
                thumb: Some(poster),
            },
            info: Some(VideoInfo {
                title: title.to_string(),
                plot: item.overview.clone(),
                year: item.year(),
                mediatype: kind.item_type(),
            }),
            playable: Some(true),
        }
    }

    /// Stand-in entry for listings the catalog can't serve
    pub fn placeholder(&self, subcategory: &str, kind: MediaKind) -> DirectoryItem {
        DirectoryItem {
            label: format!("Placeholder for {} {}", subcategory, kind.label()),
            url: self.url(&[]),
            is_folder: false,
            art: Art::default(),
            info: None,
            playable: None,
        }
    }
}
