use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const ARCHIVE_BASE_URL: &str = "https://archive.org";

const CANNED_TITLE: &str = "Public Domain Movie 1";
const CANNED_IDENTIFIER: &str = "mock_public_domain_movie_1";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("xml parse error: {0}")]
    XmlError(#[from] quick_xml::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("not an item page: {0}")]
    InvalidItemPage(String),
}

/// Public-domain search page for a title on the archive site
pub fn search_url(title: &str) -> String {
    format!(
        "{}/details/movies?and%5B%5D=publicdomain&and%5B%5D=title%3A%28{}%29",
        ARCHIVE_BASE_URL,
        urlencoding::encode(title)
    )
}

/// Finds item pages for titles and resolves them to direct playable URLs
#[async_trait]
pub trait StreamSource: Send + Sync {
    fn name(&self) -> &str;

    /// Item page URL for the best match of `title`
    async fn search(&self, title: &str) -> Result<Option<String>, ArchiveError>;

    /// Direct playable URL hosted on the item page
    async fn resolve(&self, item_page_url: &str) -> Result<Option<String>, ArchiveError>;

    async fn resolve_stream_url(&self, title: &str) -> Result<Option<String>, ArchiveError> {
        let Some(item_page) = self.search(title).await? else {
            debug!(title, source = self.name(), "no item page found");
            return Ok(None);
        };

        self.resolve(&item_page).await
    }
}

/// Lookup table standing in for the archive site. Only titles containing
/// "Public Domain Movie 1" have a stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedArchive;

#[async_trait]
impl StreamSource for CannedArchive {
    fn name(&self) -> &str {
        "canned"
    }

    async fn search(&self, title: &str) -> Result<Option<String>, ArchiveError> {
        debug!(title, url = %search_url(title), "canned archive search");

        if title.contains(CANNED_TITLE) {
            return Ok(Some(format!(
                "{}/details/{}",
                ARCHIVE_BASE_URL, CANNED_IDENTIFIER
            )));
        }

        Ok(None)
    }

    async fn resolve(&self, item_page_url: &str) -> Result<Option<String>, ArchiveError> {
        debug!(item_page_url, "canned archive resolve");

        if item_page_url.contains(CANNED_IDENTIFIER) {
            return Ok(Some(format!(
                "{}/download/{}/mock_movie_1.mp4",
                ARCHIVE_BASE_URL, CANNED_IDENTIFIER
            )));
        }

        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct AdvancedSearchResponse {
    response: AdvancedSearchBody,
}

#[derive(Debug, Deserialize)]
struct AdvancedSearchBody {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: String,
}

/// A file entry from an item's `_files.xml` listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveFile {
    pub name: String,
    pub source: String,
    pub format: Option<String>,
}

impl ArchiveFile {
    fn is_mp4(&self) -> bool {
        self.name.to_lowercase().ends_with(".mp4")
    }

    fn is_video_format(&self) -> bool {
        self.format
            .as_deref()
            .map(|f| f.contains("MPEG4") || f.eq_ignore_ascii_case("h.264"))
            .unwrap_or(false)
    }
}

/// Live client for archive.org's search and download endpoints
pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl ArchiveClient {
    /// Client for the archive site at `base_url` (config or a mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Identifier part of a `/details/<identifier>` page URL
    pub fn identifier_from_page(item_page_url: &str) -> Result<String, ArchiveError> {
        let invalid = || ArchiveError::InvalidItemPage(item_page_url.to_string());

        let url = Url::parse(item_page_url).map_err(|_| invalid())?;
        let mut segments = url.path_segments().ok_or_else(invalid)?;

        segments
            .by_ref()
            .find(|s| *s == "details")
            .ok_or_else(invalid)?;

        match segments.next() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(invalid()),
        }
    }

    /// List the files of an item
    pub async fn list_files(&self, identifier: &str) -> Result<Vec<ArchiveFile>, ArchiveError> {
        let url = format!(
            "{}/download/{}/{}_files.xml",
            self.base_url, identifier, identifier
        );

        debug!(url = %url, "fetching archive file list");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ArchiveError::InvalidResponse(format!(
                "status: {}",
                response.status()
            )));
        }

        let xml = response.text().await?;
        parse_files_xml(&xml)
    }

    fn download_url(&self, identifier: &str, file_name: &str) -> String {
        let encoded = file_name
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/download/{}/{}", self.base_url, identifier, encoded)
    }
}

#[async_trait]
impl StreamSource for ArchiveClient {
    fn name(&self) -> &str {
        "archive.org"
    }

    async fn search(&self, title: &str) -> Result<Option<String>, ArchiveError> {
        let clean_title = title.replace('"', "");
        let query = format!(
            "title:(\"{}\") AND mediatype:(movies) AND collection:(publicdomain OR feature_films)",
            clean_title
        );
        let url = format!("{}/advancedsearch.php", self.base_url);

        debug!(title, query = %query, "searching archive");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("fl[]", "identifier"),
                ("rows", "1"),
                ("output", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchiveError::InvalidResponse(format!(
                "status: {}",
                response.status()
            )));
        }

        let body: AdvancedSearchResponse = response.json().await?;

        Ok(body
            .response
            .docs
            .into_iter()
            .next()
            .map(|doc| format!("{}/details/{}", self.base_url, doc.identifier)))
    }

    async fn resolve(&self, item_page_url: &str) -> Result<Option<String>, ArchiveError> {
        let identifier = Self::identifier_from_page(item_page_url)?;
        let files = self.list_files(&identifier).await?;

        let Some(file) = pick_stream_file(&files) else {
            debug!(identifier = %identifier, files = files.len(), "no playable file on item");
            return Ok(None);
        };

        let url = self.download_url(&identifier, &file.name);
        info!(identifier = %identifier, file = %file.name, "resolved archive stream");
        Ok(Some(url))
    }
}

/// Prefer an original mp4, then any mp4, then anything tagged as an MPEG4/h.264 video.
pub fn pick_stream_file(files: &[ArchiveFile]) -> Option<&ArchiveFile> {
    files
        .iter()
        .find(|f| f.is_mp4() && f.source == "original")
        .or_else(|| files.iter().find(|f| f.is_mp4()))
        .or_else(|| files.iter().find(|f| f.is_video_format()))
}

/// Parse an item's `_files.xml` listing
pub fn parse_files_xml(xml: &str) -> Result<Vec<ArchiveFile>, ArchiveError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut files = Vec::new();
    let mut current: Option<ArchiveFile> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "file" {
                    current = Some(file_from_attributes(e, reader.decoder())?);
                }

                current_element = name;
            }
            Event::Empty(ref e) => {
                if e.name().as_ref() == b"file" {
                    let file = file_from_attributes(e, reader.decoder())?;
                    if !file.name.is_empty() {
                        files.push(file);
                    }
                }
            }
            Event::Text(ref e) => {
                if current_element == "format"
                    && let Some(ref mut file) = current
                {
                    file.format = Some(String::from_utf8_lossy(e).to_string());
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"file"
                    && let Some(file) = current.take()
                    && !file.name.is_empty()
                {
                    files.push(file);
                }
                current_element.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(files)
}

// Names come entity-escaped (`&amp;`), so values are unescaped before use
fn file_from_attributes(e: &BytesStart, decoder: Decoder) -> Result<ArchiveFile, ArchiveError> {
    let mut file = ArchiveFile::default();
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => file.name = attr.decode_and_unescape_value(decoder)?.into_owned(),
            b"source" => file.source = attr.decode_and_unescape_value(decoder)?.into_owned(),
            _ => {}
        }
    }
    Ok(file)
}
