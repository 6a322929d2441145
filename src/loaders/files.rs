//! Loader for directory trees of raw publication files.
//!
//! PDFs are parsed page by page into one document per page (extraction runs
//! on a blocking thread — the parser is CPU-bound); Markdown and plain-text
//! files load whole. Files that fail to parse are skipped with a warning.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::task;
use tracing::warn;

use crate::normalize::clean;
use crate::types::{Document, IngestError, Metadata, keys};

/// Recursively loads every supported file under `dir`.
pub async fn load_dir(dir: &Path) -> Result<Vec<Document>, IngestError> {
    let mut docs = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                stack.push(path);
                continue;
            }
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_lowercase);
            let loaded = match extension.as_deref() {
                Some("pdf") => load_pdf(&path).await,
                Some("md" | "txt") => load_text(&path).await,
                _ => continue,
            };
            match loaded {
                Ok(mut file_docs) => docs.append(&mut file_docs),
                Err(err) => warn!(file = %path.display(), %err, "skipping unparsable file"),
            }
        }
    }
    Ok(docs)
}

/// One document per PDF page; empty pages are dropped.
async fn load_pdf(path: &Path) -> Result<Vec<Document>, IngestError> {
    let path_buf: PathBuf = path.to_path_buf();
    let pages = task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&path_buf))
        .await
        .map_err(|err| IngestError::Parse(err.to_string()))?
        .map_err(|err| IngestError::Parse(err.to_string()))?;

    let mut docs = Vec::new();
    for (number, page) in pages.iter().enumerate() {
        let content = clean(page);
        if content.is_empty() {
            continue;
        }
        let mut metadata = base_metadata(path, "pdf");
        metadata.insert(keys::PAGE.into(), Value::from(number + 1));
        docs.push(Document::new(content, metadata));
    }
    Ok(docs)
}

/// Whole-file document for Markdown and plain text.
async fn load_text(path: &Path) -> Result<Vec<Document>, IngestError> {
    let raw = fs::read_to_string(path).await?;
    let content = clean(&raw);
    if content.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![Document::new(content, base_metadata(path, "text"))])
}

fn base_metadata(path: &Path, source_type: &str) -> Metadata {
    let title = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("untitled")
        .to_string();
    let mut metadata = Metadata::new();
    metadata.insert(
        keys::SOURCE.into(),
        Value::String(path.display().to_string()),
    );
    metadata.insert(keys::SOURCE_TYPE.into(), Value::String(source_type.into()));
    metadata.insert(keys::TITLE.into(), Value::String(title));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loads_markdown_and_text_files_whole() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("inner");
        fs::create_dir_all(&nested).await.unwrap();
        fs::write(dir.path().join("guide.md"), "# Guide\n\nSome   guide text.")
            .await
            .unwrap();
        fs::write(nested.join("notes.txt"), "plain notes here").await.unwrap();
        fs::write(nested.join("data.bin"), [0u8, 1, 2]).await.unwrap();

        let mut docs = load_dir(dir.path()).await.unwrap();
        docs.sort_by(|a, b| a.meta_str(keys::TITLE).cmp(&b.meta_str(keys::TITLE)));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].meta_str(keys::TITLE), Some("guide.md"));
        assert_eq!(docs[0].text, "# Guide\n\nSome guide text.");
        assert_eq!(docs[0].meta_str(keys::SOURCE_TYPE), Some("text"));
        assert_eq!(docs[1].meta_str(keys::TITLE), Some("notes.txt"));
    }

    #[tokio::test]
    async fn empty_after_cleaning_files_are_dropped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("empty.txt"), "  \n\n  ").await.unwrap();
        fs::write(dir.path().join("image_only.md"), "![only](a.png)")
            .await
            .unwrap();
        let docs = load_dir(dir.path()).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn corrupt_pdfs_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf").await.unwrap();
        fs::write(dir.path().join("real.txt"), "surviving text file")
            .await
            .unwrap();
        let docs = load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].meta_str(keys::TITLE), Some("real.txt"));
    }
}
