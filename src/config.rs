use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::region::RegionBypass;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory not found")]
    NoConfigDir,
    #[error("failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub addon: AddonConfig,
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub region: RegionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddonConfig {
    #[serde(default = "default_addon_id")]
    pub id: String,
    #[serde(default = "default_addon_name")]
    pub name: String,
    /// Base URL the host uses to call back into the plugin
    pub plugin_url: Option<String>,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            id: default_addon_id(),
            name: default_addon_name(),
            plugin_url: None,
        }
    }
}

impl AddonConfig {
    pub fn plugin_url(&self) -> String {
        self.plugin_url
            .clone()
            .unwrap_or_else(|| format!("plugin://{}/", self.id))
    }
}

fn default_addon_id() -> String {
    "plugin.video.penguinsurf".to_string()
}

fn default_addon_name() -> String {
    "PenguinSurf".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    pub apikey: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            apikey: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_image_base_url() -> String {
    crate::tmdb::IMAGE_BASE_URL.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    /// Fixed lookup table, no network access
    #[default]
    Canned,
    Live,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub mode: ArchiveMode,
    #[serde(default = "default_archive_base_url")]
    pub base_url: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            mode: ArchiveMode::default(),
            base_url: default_archive_base_url(),
        }
    }
}

fn default_archive_base_url() -> String {
    "https://archive.org".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    #[serde(default = "default_restricted_host")]
    pub restricted_host: String,
    #[serde(default = "default_proxy_host")]
    pub proxy_host: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            restricted_host: default_restricted_host(),
            proxy_host: default_proxy_host(),
        }
    }
}

impl RegionConfig {
    pub fn bypass(&self) -> RegionBypass {
        RegionBypass::new(&self.restricted_host, &self.proxy_host)
    }
}

fn default_restricted_host() -> String {
    crate::region::DEFAULT_RESTRICTED_HOST.to_string()
}

fn default_proxy_host() -> String {
    crate::region::DEFAULT_PROXY_HOST.to_string()
}

impl Config {
    /// Load from the platform config dir, falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "penguinsurf")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn tmdb(&self) -> TmdbConfig {
        self.tmdb.clone().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tmdb) = &self.tmdb {
            validate_base_url("tmdb.base_url", &tmdb.base_url)?;
            validate_base_url("tmdb.image_base_url", &tmdb.image_base_url)?;
            if tmdb.apikey.as_deref().is_some_and(str::is_empty) {
                return Err(ConfigError::ValidationError(
                    "tmdb.apikey cannot be empty".to_string(),
                ));
            }
        }

        validate_base_url("archive.base_url", &self.archive.base_url)?;

        if self.region.restricted_host.is_empty() || self.region.proxy_host.is_empty() {
            return Err(ConfigError::ValidationError(
                "region hosts cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https://",
            field
        )));
    }

    Ok(())
}
