//! Duplicate removal over loaded documents.
//!
//! Two documents are duplicates iff both fingerprint components match: the
//! dedup-normalized text and the identity key. Identity falls back through
//! `publication_id` → `source` → `source_url` → empty string; the empty-key
//! collision across unrelated documents lacking all three is an accepted
//! heuristic, not a bug to fix here.

use std::collections::HashSet;

use crate::field_map::value_to_string;
use crate::normalize::normalize_for_dedup;
use crate::types::{Document, keys};

/// First present identity key for a document, stringified.
pub fn identity_key(doc: &Document) -> String {
    [keys::PUBLICATION_ID, keys::SOURCE, keys::SOURCE_URL]
        .iter()
        .filter_map(|key| doc.metadata.get(*key))
        .find(|value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        })
        .map(value_to_string)
        .unwrap_or_default()
}

/// Removes documents whose (normalized text, identity key) fingerprint has
/// already been seen. Order-preserving; the first occurrence wins.
pub fn dedup(docs: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(docs.len());
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let fingerprint = (normalize_for_dedup(&doc.text), identity_key(&doc));
        if seen.insert(fingerprint) {
            out.push(doc);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use serde_json::json;

    fn doc(text: &str, meta: serde_json::Value) -> Document {
        Document::new(text, meta.as_object().cloned().unwrap_or_else(Metadata::new))
    }

    #[test]
    fn drops_exact_duplicates_keeping_first() {
        let docs = vec![
            doc("Alpha beta", json!({"publication_id": "p1"})),
            doc("alpha   BETA", json!({"publication_id": "p1"})),
            doc("Gamma delta", json!({"publication_id": "p1"})),
        ];
        let out = dedup(docs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Alpha beta");
        assert_eq!(out[1].text, "Gamma delta");
    }

    #[test]
    fn same_text_different_identity_survives() {
        let docs = vec![
            doc("Shared text", json!({"publication_id": "p1"})),
            doc("Shared text", json!({"publication_id": "p2"})),
        ];
        assert_eq!(dedup(docs).len(), 2);
    }

    #[test]
    fn identity_falls_back_through_source_and_url() {
        let by_source = doc("t", json!({"source": "a.json"}));
        assert_eq!(identity_key(&by_source), "a.json");

        let by_url = doc("t", json!({"source_url": "https://x/y"}));
        assert_eq!(identity_key(&by_url), "https://x/y");

        let none = doc("t", json!({}));
        assert_eq!(identity_key(&none), "");

        let empty_id = doc("t", json!({"publication_id": "", "source": "s"}));
        assert_eq!(identity_key(&empty_id), "s");
    }

    #[test]
    fn documents_without_identity_collapse_on_text_alone() {
        let docs = vec![doc("Same words", json!({})), doc("same words", json!({}))];
        assert_eq!(dedup(docs).len(), 1);
    }
}
