//! The CLI's stand-in for a browser tab: resolves the page argument to a URL
//! and loads its text when the driver asks for it.

mod text;


use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use futures_util::{Stream, StreamExt};
use pagechat_common::PageChatError;
use pagechat_driver::{PageContent, PageHost};
use tracing::{info, warn};
use url::Url;

pub use text::html_to_text;

/// Largest page body read before giving up.
const MAX_PAGE_BYTES: u64 = 5 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Covers the whole exchange, body included.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Turn the page argument into a URL. Anything that does not parse as a URL
/// is taken as a local path.
pub fn resolve_page(arg: &str) -> Result<Url, PageChatError> {
    if let Ok(url) = Url::parse(arg) {
        // `C:\notes.txt` parses with a one-letter scheme
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }
    let path = std::fs::canonicalize(arg)?;
    Url::from_file_path(&path)
        .map_err(|_| PageChatError::Page(format!("not a usable path: {}", path.display())))
}

pub struct CliPageHost {
    url: Url,
    is_video: bool,
    http: reqwest::Client,
}

impl CliPageHost {
    pub fn new(url: Url, is_video: bool) -> Result<Self, PageChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| PageChatError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { url, is_video, http })
    }

    async fn load(&self) -> Result<String, PageChatError> {
        let (body, is_html) = match self.url.scheme() {
            "file" => self.load_file().await?,
            "data" => decode_data_url(self.url.as_str())?,
            "http" | "https" => self.load_http().await?,
            other => return Err(PageChatError::Page(format!("unsupported scheme: {other}"))),
        };
        Ok(if is_html { html_to_text(&body) } else { body })
    }

    async fn load_file(&self) -> Result<(String, bool), PageChatError> {
        let path = self
            .url
            .to_file_path()
            .map_err(|_| PageChatError::Page(format!("not a local file: {}", self.url)))?;
        let metadata = tokio::fs::metadata(&path).await?;
        if metadata.len() > MAX_PAGE_BYTES {
            return Err(PageChatError::Page(format!(
                "{} is too large ({} bytes)",
                path.display(),
                metadata.len()
            )));
        }
        let body = tokio::fs::read_to_string(&path).await?;
        Ok((body, has_html_extension(&path)))
    }

    async fn load_http(&self) -> Result<(String, bool), PageChatError> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| PageChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageChatError::Network(format!("HTTP {status} from {}", self.url)));
        }
        if response.content_length().is_some_and(|len| len > MAX_PAGE_BYTES) {
            return Err(PageChatError::Page(format!("{} is too large", self.url)));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("html"));
        let body = read_capped(response.bytes_stream(), MAX_PAGE_BYTES).await?;
        let body = String::from_utf8(body)
            .map_err(|_| PageChatError::Page(format!("{} is not UTF-8 text", self.url)))?;
        Ok((body, is_html))
    }
}

#[async_trait]
impl PageHost for CliPageHost {
    fn page_url(&self) -> Option<Url> {
        Some(self.url.clone())
    }

    // The page is loaded on demand, so it is always ready
    fn is_document_on_load_completed(&self) -> bool {
        true
    }

    fn has_primary_main_frame(&self) -> bool {
        true
    }

    async fn page_content(&self) -> PageContent {
        let text = match self.load().await {
            Ok(text) => {
                info!(url = %self.url, chars = text.chars().count(), "page loaded");
                text
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "failed to load page");
                String::new()
            }
        };
        PageContent {
            text,
            is_video: self.is_video,
        }
    }
}

/// Collect a response body, failing as soon as it grows past `limit` bytes.
/// `Content-Length` is only a hint; chunked bodies carry none.
pub(crate) async fn read_capped<S, B, E>(chunks: S, limit: u64) -> Result<Vec<u8>, PageChatError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut body = Vec::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| PageChatError::Network(e.to_string()))?;
        let chunk = chunk.as_ref();
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(PageChatError::Page(format!("page body exceeds {limit} bytes")));
        }
        body.extend_from_slice(chunk);
    }
    Ok(body)
}

/// Decode a `data:` URL into its text and whether the media type is HTML.
pub(crate) fn decode_data_url(url: &str) -> Result<(String, bool), PageChatError> {
    let malformed = || PageChatError::Page("malformed data URL".into());

    let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
    let (meta, data) = rest.split_once(',').ok_or_else(malformed)?;
    let (media_type, is_base64) = match meta.strip_suffix(";base64") {
        Some(media_type) => (media_type, true),
        None => (meta, false),
    };

    let bytes = if is_base64 {
        let data = urlencoding::decode(data).map_err(|_| malformed())?;
        B64.decode(data.trim())
            .map_err(|e| PageChatError::Page(format!("bad base64 in data URL: {e}")))?
    } else {
        urlencoding::decode_binary(data.as_bytes()).into_owned()
    };
    let text = String::from_utf8(bytes)
        .map_err(|_| PageChatError::Page("data URL is not UTF-8 text".into()))?;

    let mime = media_type.split(';').next().unwrap_or_default().trim();
    Ok((text, mime.eq_ignore_ascii_case("text/html")))
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}
