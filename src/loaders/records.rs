//! Loader for structured publication records.
//!
//! Accepts a JSON file (array of records or a single record), a JSONL /
//! NDJSON file, or a directory tree of such files. Field names are resolved
//! through a [`FieldMap`]; record content follows a fixed precedence — a
//! markdown-ish `description` field gets segmented, a structured `sections`
//! array is taken element-by-element, and `abstract`/`body` are the
//! fallback. Malformed files and lines are skipped, never fatal.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::extract::extract;
use crate::field_map::{FieldMap, coerce_string_list};
use crate::normalize::clean;
use crate::segment::segment;
use crate::types::{Document, IngestError, Metadata, keys};

/// Minimum word count for a section-level document.
const MIN_SECTION_WORDS: usize = 5;

/// Characters of canonical JSON hashed into a fallback record identity.
const FINGERPRINT_PREFIX_CHARS: usize = 2000;

/// Loads canonical documents from `path` using the given field map.
pub async fn load_records(path: &Path, map: &FieldMap) -> Result<Vec<Document>, IngestError> {
    let source_label = path.display().to_string();
    let mut docs = Vec::new();
    for file in collect_record_files(path).await? {
        let raw = match fs::read_to_string(&file).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(file = %file.display(), %err, "skipping unreadable record file");
                continue;
            }
        };
        for record in parse_records(&file, &raw) {
            docs.extend(record_to_documents(&record, map, &source_label));
        }
    }
    Ok(docs)
}

/// Resolves the input path to the record files beneath it. A file argument
/// is returned as-is; a directory is walked recursively for
/// `.json`/`.jsonl`/`.ndjson` files.
async fn collect_record_files(path: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let metadata = fs::metadata(path).await?;
    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut stack = vec![path.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry.file_type().await?.is_dir() {
                stack.push(entry_path);
            } else if matches!(
                extension(&entry_path).as_deref(),
                Some("json" | "jsonl" | "ndjson")
            ) {
                files.push(entry_path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Parses one file's contents into records. JSONL files are parsed line by
/// line and malformed lines are skipped; JSON files may hold an array of
/// records or a single record, and an unparsable file yields nothing.
fn parse_records(path: &Path, raw: &str) -> Vec<Metadata> {
    if matches!(extension(path).as_deref(), Some("jsonl" | "ndjson")) {
        let mut records = Vec::new();
        for (number, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(record)) => records.push(record),
                Ok(_) => {
                    warn!(file = %path.display(), line = number + 1, "skipping non-object record");
                }
                Err(err) => {
                    warn!(file = %path.display(), line = number + 1, %err, "skipping malformed record line");
                }
            }
        }
        return records;
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        Ok(Value::Object(record)) => vec![record],
        Ok(_) => {
            warn!(file = %path.display(), "skipping record file with non-object payload");
            Vec::new()
        }
        Err(err) => {
            warn!(file = %path.display(), %err, "skipping unparsable record file");
            Vec::new()
        }
    }
}

/// 16-hex-char content identity for records that carry no id of their own,
/// derived from the head of the record's canonical JSON serialization.
fn record_fingerprint(record: &Metadata) -> String {
    let serialized = serde_json::to_string(record).unwrap_or_default();
    let head: String = serialized.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
    let digest = blake3::hash(head.as_bytes());
    digest.to_hex().as_str()[..16].to_string()
}

/// Expands one record into its section documents.
fn record_to_documents(record: &Metadata, map: &FieldMap, source: &str) -> Vec<Document> {
    let publication_id = map
        .resolve_string(record, "id")
        .unwrap_or_else(|| record_fingerprint(record));
    let username = map.resolve(record, "username").cloned();
    let mut authors = coerce_string_list(map.resolve(record, "authors"));
    if authors.is_empty() {
        if let Some(name) = username.as_ref().filter(|value| !value.is_null()) {
            authors = coerce_string_list(Some(name));
        }
    }

    let mut base = Metadata::new();
    base.insert(keys::PUBLICATION_ID.into(), Value::String(publication_id));
    base.insert(
        keys::TITLE.into(),
        map.resolve(record, "title")
            .cloned()
            .unwrap_or_else(|| Value::String("Untitled".into())),
    );
    base.insert(keys::AUTHORS.into(), Value::from(authors));
    base.insert(
        keys::DATE.into(),
        map.resolve(record, "date").cloned().unwrap_or(Value::Null),
    );
    base.insert(keys::SOURCE.into(), Value::String(source.to_string()));
    base.insert(
        keys::SOURCE_URL.into(),
        map.resolve(record, "url").cloned().unwrap_or(Value::Null),
    );
    base.insert(keys::SOURCE_TYPE.into(), Value::String("json".into()));
    base.insert(keys::DOC_TYPE.into(), Value::String("publication".into()));
    base.insert(
        keys::LICENSE.into(),
        map.resolve(record, "license")
            .cloned()
            .unwrap_or_else(|| Value::String("unknown".into())),
    );
    base.insert(keys::USERNAME.into(), username.unwrap_or(Value::Null));

    // Content precedence: description with dividers, else structured
    // sections, else abstract/body.
    let description = map
        .resolve(record, "description")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty());

    if let Some(description) = description {
        // One extraction pass over the whole description; every section
        // shares the result.
        let fields = extract(description);
        let mut docs = Vec::new();
        for section in segment(description) {
            let mut metadata = base.clone();
            fields.merge_into(&mut metadata);
            metadata.insert(keys::SECTION.into(), Value::String(section.title));
            docs.push(Document::new(section.body, metadata));
        }
        return docs;
    }

    if let Some(Value::Array(sections)) = map.resolve(record, "sections") {
        let mut docs = Vec::new();
        for section in sections {
            let Value::Object(section) = section else {
                debug!("skipping non-object section element");
                continue;
            };
            let title = map
                .resolve_string(section, "section_title")
                .unwrap_or_else(|| "Section".into());
            let Some(text) = map.resolve_string(section, "section_text") else {
                continue;
            };
            let content = clean(&text);
            if content.split_whitespace().count() < MIN_SECTION_WORDS {
                continue;
            }
            let mut metadata = base.clone();
            metadata.insert(keys::SECTION.into(), Value::String(title));
            docs.push(Document::new(content, metadata));
        }
        return docs;
    }

    let mut docs = Vec::new();
    for (field, section_title) in [("abstract", "Abstract"), ("body", "Body")] {
        let Some(text) = map.resolve_string(record, field) else {
            continue;
        };
        let content = clean(&text);
        if content.split_whitespace().count() < MIN_SECTION_WORDS {
            continue;
        }
        let mut metadata = base.clone();
        metadata.insert(keys::SECTION.into(), Value::String(section_title.into()));
        docs.push(Document::new(content, metadata));
    }
    docs
}
