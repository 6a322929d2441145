//! Source loaders that turn raw inputs into canonical [`Document`]s.
//!
//! One loader per source kind:
//!
//! * [`records`] — structured publication records (JSON / JSONL).
//! * [`files`] — directory trees of PDF, Markdown, and plain-text files.
//! * [`web`] — newline-delimited URL lists.
//! * [`wiki`] — newline-delimited encyclopedia title lists.
//!
//! All loaders share the continue-on-error policy: a malformed record or a
//! failed fetch is logged and skipped, and only unusable inputs (missing
//! list file, unreadable directory) abort the load.
//!
//! [`Document`]: crate::types::Document

pub mod files;
pub mod records;
pub mod web;
pub mod wiki;

pub use files::load_dir;
pub use records::load_records;
pub use web::WebLoader;
pub use wiki::WikipediaLoader;

use std::path::Path;

use tokio::fs;

use crate::types::IngestError;

/// Reads a newline-delimited list file, skipping blank lines and
/// `#`-prefixed comments.
pub async fn read_list_file(path: &Path) -> Result<Vec<String>, IngestError> {
    let raw = fs::read_to_string(path).await?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
