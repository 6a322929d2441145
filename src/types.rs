//! Core document types and the crate error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-form document metadata, keyed by the constants in [`keys`].
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata keys shared across pipeline stages.
///
/// Loaders write these, dedup reads the identity keys, and the index
/// builder persists the whole map verbatim.
pub mod keys {
    pub const PUBLICATION_ID: &str = "publication_id";
    pub const SOURCE: &str = "source";
    pub const SOURCE_URL: &str = "source_url";
    pub const TITLE: &str = "title";
    pub const AUTHORS: &str = "authors";
    pub const DATE: &str = "date";
    pub const LICENSE: &str = "license";
    pub const SOURCE_TYPE: &str = "source_type";
    pub const DOC_TYPE: &str = "doc_type";
    pub const SECTION: &str = "section";
    pub const USERNAME: &str = "username";
    pub const PAGE: &str = "page";
}

/// A unit of text plus its descriptive attributes.
///
/// Documents are created by loaders, consumed read-only by dedup and
/// chunking, and terminally consumed by the index builder. Chunks are
/// Documents too: a chunk inherits its source's metadata unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Returns a metadata value as `&str`, if present and a string.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|value| value.as_str())
    }

    /// Whitespace-delimited word count of the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Errors surfaced by the ingestion pipeline.
///
/// Per-item failures (a malformed record, an unreachable URL) are handled
/// where they occur and never become an `IngestError`; this type covers the
/// failures that abort a stage: bad configuration, unusable inputs, and
/// collaborator errors.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("index error: {0}")]
    Index(String),
}
