//! Loader for encyclopedia pages via the MediaWiki extracts API.
//!
//! One request per title against `{lang}.wikipedia.org`; pages that do not
//! exist are skipped silently, fetch failures are logged and skipped. The
//! API endpoint is overridable so tests can point the loader at a mock
//! server.

use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::read_list_file;
use crate::normalize::clean;
use crate::types::{Document, IngestError, Metadata, keys};

const WIKIPEDIA_LICENSE: &str = "CC BY-SA 4.0";

pub struct WikipediaLoader {
    client: Client,
    lang: String,
    api_endpoint: Option<Url>,
}

impl WikipediaLoader {
    pub fn new(lang: impl Into<String>) -> Result<Self, IngestError> {
        let client = Client::builder()
            .user_agent(concat!("ragforge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, lang))
    }

    pub fn with_client(client: Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
            api_endpoint: None,
        }
    }

    /// Points the loader at an alternative API endpoint (tests).
    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: Url) -> Self {
        self.api_endpoint = Some(endpoint);
        self
    }

    fn endpoint(&self) -> String {
        self.api_endpoint
            .as_ref()
            .map(Url::to_string)
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.lang))
    }

    /// Loads every title in `titles_file` (blank and `#` lines ignored).
    pub async fn load(&self, titles_file: &Path) -> Result<Vec<Document>, IngestError> {
        let titles = read_list_file(titles_file).await?;
        let mut docs = Vec::new();
        for title in &titles {
            match self.fetch_page(title).await {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => debug!(title = %title, "page missing or empty, skipping"),
                Err(err) => warn!(title = %title, %err, "fetch failed, skipping"),
            }
        }
        Ok(docs)
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<Document>, IngestError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?;
        let payload: ExtractsResponse = response.json().await?;

        let Some(page) = payload
            .query
            .and_then(|query| query.pages.into_iter().next())
        else {
            return Ok(None);
        };
        if page.missing {
            return Ok(None);
        }
        let content = clean(&page.extract.unwrap_or_default());
        if content.is_empty() {
            return Ok(None);
        }

        let mut metadata = Metadata::new();
        metadata.insert(keys::TITLE.into(), Value::String(page.title.clone()));
        metadata.insert(
            keys::SOURCE_URL.into(),
            Value::String(format!(
                "https://{}.wikipedia.org/wiki/{}",
                self.lang,
                page.title.replace(' ', "_")
            )),
        );
        metadata.insert(keys::LICENSE.into(), Value::String(WIKIPEDIA_LICENSE.into()));
        metadata.insert(keys::SOURCE_TYPE.into(), Value::String("wikipedia".into()));
        metadata.insert(keys::DOC_TYPE.into(), Value::String("wikipedia".into()));
        Ok(Some(Document::new(content, metadata)))
    }
}

#[derive(Debug, Deserialize)]
struct ExtractsResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    title: String,
    #[serde(default)]
    missing: bool,
    extract: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formatversion_two_payloads() {
        let raw = r#"{
            "batchcomplete": true,
            "query": {"pages": [
                {"pageid": 1, "ns": 0, "title": "Rust", "extract": "A systems language."}
            ]}
        }"#;
        let payload: ExtractsResponse = serde_json::from_str(raw).unwrap();
        let page = &payload.query.unwrap().pages[0];
        assert_eq!(page.title, "Rust");
        assert!(!page.missing);
    }

    #[test]
    fn parses_missing_pages() {
        let raw = r#"{"query": {"pages": [{"ns": 0, "title": "Nope", "missing": true}]}}"#;
        let payload: ExtractsResponse = serde_json::from_str(raw).unwrap();
        assert!(payload.query.unwrap().pages[0].missing);
    }
}
