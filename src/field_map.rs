//! Canonical-field resolution for heterogeneous record schemas.
//!
//! Source collections disagree on key names: one calls it `paper_id`,
//! another `uuid`; one nests authors as `[{name: ...}]`, another stores a
//! bare string. [`FieldMap`] is an explicit ordered-alias table — canonical
//! field name to candidate source keys — plus a small resolution function.
//! No per-source-format types: schema differences live in data, not code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tokio::fs;

use crate::types::{IngestError, Metadata};

/// Built-in alias table. The first listed key that resolves wins.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("id", &["id", "paper_id", "uuid"]),
    ("username", &["username", "author", "owner"]),
    ("title", &["title", "name"]),
    ("authors", &["authors", "author_list", "creators"]),
    ("date", &["date", "published_at", "publication_date", "year"]),
    ("url", &["url", "source_url", "link"]),
    ("license", &["license"]),
    // Content fields
    ("description", &["publication_description", "description"]),
    ("abstract", &["abstract", "summary"]),
    ("body", &["body", "content", "full_text", "text"]),
    ("sections", &["sections", "section_list"]),
    ("section_title", &["heading", "title", "name"]),
    ("section_text", &["text", "content", "body"]),
    // Domain fields (if present)
    ("models_used", &["models_used", "models"]),
    ("tools_used", &["tools_used", "tools"]),
    ("limitations", &["limitations"]),
    ("assumptions", &["assumptions"]),
];

/// A user-supplied alias override: a single key or an ordered key list.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AliasSpec {
    One(String),
    Many(Vec<String>),
}

impl AliasSpec {
    fn into_list(self) -> Vec<String> {
        match self {
            AliasSpec::One(key) => vec![key],
            AliasSpec::Many(keys) => keys,
        }
    }
}

/// Per-field overrides parsed from a YAML or JSON file.
pub type FieldOverrides = BTreeMap<String, AliasSpec>;

/// Ordered alias table mapping canonical field names to source keys.
#[derive(Clone, Debug)]
pub struct FieldMap {
    fields: BTreeMap<String, Vec<String>>,
}

impl Default for FieldMap {
    fn default() -> Self {
        let fields = DEFAULT_ALIASES
            .iter()
            .map(|(field, aliases)| {
                (
                    (*field).to_string(),
                    aliases.iter().map(|alias| (*alias).to_string()).collect(),
                )
            })
            .collect();
        Self { fields }
    }
}

impl FieldMap {
    /// Builds a map from the defaults with per-field overrides applied.
    ///
    /// An override replaces the whole key list for its field; it does not
    /// merge with the defaults for that field.
    pub fn with_overrides(overrides: FieldOverrides) -> Self {
        let mut map = Self::default();
        for (field, spec) in overrides {
            map.fields.insert(field, spec.into_list());
        }
        map
    }

    /// Candidate source keys for a canonical field, in priority order.
    pub fn aliases(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Resolves a canonical field against a record: the first listed key
    /// whose value is present — not null, not an empty string, not an
    /// empty array.
    pub fn resolve<'a>(&self, record: &'a Metadata, field: &str) -> Option<&'a Value> {
        self.aliases(field)
            .iter()
            .filter_map(|key| record.get(key))
            .find(|value| is_present(value))
    }

    /// Like [`resolve`](Self::resolve), stringifying scalar values.
    pub fn resolve_string(&self, record: &Metadata, field: &str) -> Option<String> {
        self.resolve(record, field).map(value_to_string)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Renders a JSON scalar the way a human wrote it: strings unquoted,
/// everything else via its JSON form.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces a resolved value into a list of strings.
///
/// A sequence of `{name: ...}` mappings projects to the names; a sequence
/// of scalars stringifies each element; a single scalar wraps into a
/// one-element list; absent values yield an empty list.
pub fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let named = items
                .first()
                .is_some_and(|item| item.is_object() && item.get("name").is_some());
            if named {
                items
                    .iter()
                    .filter_map(|item| item.get("name"))
                    .filter(|name| is_present(name))
                    .map(value_to_string)
                    .collect()
            } else {
                items.iter().map(value_to_string).collect()
            }
        }
        Some(other) => vec![value_to_string(other)],
    }
}

/// Loads a field-map override file. `.yml`/`.yaml` parse as YAML, anything
/// else as JSON.
pub async fn load_overrides(path: &Path) -> Result<FieldOverrides, IngestError> {
    let raw = fs::read_to_string(path).await?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
    if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|err| IngestError::Parse(format!("{}: {err}", path.display())))
    } else {
        serde_json::from_str(&raw)
            .map_err(|err| IngestError::Parse(format!("{}: {err}", path.display())))
    }
}
