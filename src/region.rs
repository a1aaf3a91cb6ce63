//! Region bypass: rewrites geo-restricted hosts to an unblocking proxy host
//! and fetches content through the rewritten URL.

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_RESTRICTED_HOST: &str = "geo-restricted.example.com";
pub const DEFAULT_PROXY_HOST: &str = "unblocked-proxy.example.com";

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct RegionBypass {
    client: Client,
    restricted_host: String,
    proxy_host: String,
}

impl Default for RegionBypass {
    fn default() -> Self {
        Self::new(DEFAULT_RESTRICTED_HOST, DEFAULT_PROXY_HOST)
    }
}

impl RegionBypass {
    pub fn new(restricted_host: &str, proxy_host: &str) -> Self {
        Self {
            client: Client::new(),
            restricted_host: restricted_host.to_string(),
            proxy_host: proxy_host.to_string(),
        }
    }

    pub fn is_restricted(&self, url: &str) -> bool {
        url.contains(&self.restricted_host)
    }

    /// Return the region-free form of `url`. URLs that don't mention the
    /// restricted host come back unchanged.
    pub fn unblocked_url(&self, url: &str) -> String {
        debug!(url, "checking url for region restriction");

        if !self.is_restricted(url) {
            return url.to_string();
        }

        let unblocked = url.replace(&self.restricted_host, &self.proxy_host);
        info!(from = url, to = %unblocked, "rewrote region restricted url");
        unblocked
    }

    /// Fetch the body behind `url`, going through the unblocked URL.
    pub async fn fetch_content(&self, url: &str) -> Result<String, RegionError> {
        let unblocked = self.unblocked_url(url);

        debug!(url = %unblocked, "fetching region free content");

        let response = self.client.get(&unblocked).send().await?;

        if !response.status().is_success() {
            return Err(RegionError::InvalidResponse(format!(
                "status: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_host_is_rewritten() {
        let bypass = RegionBypass::default();
        assert_eq!(
            bypass.unblocked_url("https://geo-restricted.example.com/video/1.mp4"),
            "https://unblocked-proxy.example.com/video/1.mp4"
        );
    }

    #[test]
    fn test_other_urls_pass_through() {
        let bypass = RegionBypass::default();
        let url = "https://archive.org/download/mock_public_domain_movie_1/mock_movie_1.mp4";
        assert!(!bypass.is_restricted(url));
        assert_eq!(bypass.unblocked_url(url), url);
        assert_eq!(bypass.unblocked_url(""), "");
    }

    #[test]
    fn test_custom_hosts() {
        let bypass = RegionBypass::new("blocked.tv", "mirror.tv");
        assert_eq!(
            bypass.unblocked_url("http://blocked.tv/a?ref=blocked.tv"),
            "http://mirror.tv/a?ref=mirror.tv"
        );
    }
}
