//! Loader for newline-delimited URL lists.
//!
//! Fetches each page sequentially with a fixed politeness delay between
//! requests, extracts the main readable text (navigation, tables, and other
//! chrome excluded), and falls back to whole-document tag stripping when
//! the extraction pass finds nothing. Per-URL failures are logged and
//! skipped; there are no retries.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

use super::read_list_file;
use crate::normalize::clean;
use crate::types::{Document, IngestError, Metadata, keys};

/// Delay between consecutive fetches.
const DEFAULT_DELAY: Duration = Duration::from_millis(200);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT: &str = concat!("ragforge/", env!("CARGO_PKG_VERSION"));

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, h1, h2, h3, h4, h5, h6, li, pre, blockquote").unwrap()
});

/// Subtrees excluded from main-text extraction.
const EXCLUDED_ANCESTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "table", "form", "noscript", "script", "style", "figure",
];

/// Block tags whose nested blocks would duplicate text if both were kept.
const BLOCK_TAGS: &[&str] = &["p", "li", "pre", "blockquote"];

/// Sequential fetcher for documentation pages.
pub struct WebLoader {
    client: Client,
    delay: Duration,
}

impl WebLoader {
    pub fn new() -> Result<Self, IngestError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            delay: DEFAULT_DELAY,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Loads every URL in `urls_file` (blank and `#` lines ignored).
    pub async fn load(&self, urls_file: &Path) -> Result<Vec<Document>, IngestError> {
        let urls = read_list_file(urls_file).await?;
        let mut docs = Vec::new();
        for (index, raw_url) in urls.iter().enumerate() {
            if index > 0 {
                sleep(self.delay).await;
            }
            match self.fetch_one(raw_url).await {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => info!(url = %raw_url, "no readable text, skipping"),
                Err(err) => warn!(url = %raw_url, %err, "fetch failed, skipping"),
            }
        }
        Ok(docs)
    }

    async fn fetch_one(&self, raw_url: &str) -> Result<Option<Document>, IngestError> {
        let url = Url::parse(raw_url).map_err(|err| IngestError::Parse(err.to_string()))?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let extracted = extract_main_text(&body).unwrap_or_else(|| strip_tags(&body));
        let content = clean(&extracted);
        if content.is_empty() {
            return Ok(None);
        }

        let mut metadata = Metadata::new();
        metadata.insert(keys::SOURCE_URL.into(), Value::String(url.to_string()));
        metadata.insert(keys::TITLE.into(), Value::String(title_from_url(&url)));
        metadata.insert(keys::SOURCE_TYPE.into(), Value::String("web".into()));
        Ok(Some(Document::new(content, metadata)))
    }
}

/// Collects text from top-level block elements, excluding page chrome.
/// Returns `None` when nothing survives so the caller can fall back.
fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    for element in document.select(&BLOCK_SELECTOR) {
        let skip = element.ancestors().filter_map(ElementRef::wrap).any(|a| {
            let name = a.value().name();
            EXCLUDED_ANCESTORS.contains(&name) || BLOCK_TAGS.contains(&name)
        });
        if skip {
            continue;
        }
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Last-resort extraction: every text node in the document.
fn strip_tags(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect::<Vec<_>>().join("\n")
}

/// Synthesizes a display title from the URL's trailing path segment:
/// hyphens become spaces, words are title-cased.
fn title_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default();
    title_case(&segment.replace('-', " "))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
