//! Property tests for the normalization and dedup invariants.

#[macro_use]
extern crate proptest;

use std::collections::HashSet;

use proptest::prelude::{Strategy, prop};
use ragforge::dedup::{dedup, identity_key};
use ragforge::normalize::{clean, normalize_for_dedup};
use ragforge::types::{Document, Metadata};

/// Text mixing the markup the normalizer targets: breaks, admonitions,
/// images, and messy whitespace, interleaved with plain words.
fn noisy_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(
        "([ \\t\\r\\n]|[a-zA-Z0-9.,]{1,12}|<br>|<br/>|:::|:::info\\{x\\}|!\\[a\\]\\(b.png\\)){0,40}",
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_clean_is_a_fixed_point(text in noisy_text_strategy()) {
        let once = clean(&text);
        prop_assert_eq!(clean(&once), once.clone());
    }

    #[test]
    fn prop_clean_never_leaves_edge_whitespace(text in noisy_text_strategy()) {
        let cleaned = clean(&text);
        prop_assert_eq!(cleaned.trim(), cleaned.as_str());
    }

    #[test]
    fn prop_dedup_normalization_is_case_and_space_blind(
        words in prop::collection::vec("[a-zA-Z]{1,8}", 1..10),
    ) {
        let spaced = words.join("   ");
        let tight = words.join(" ").to_uppercase();
        prop_assert_eq!(normalize_for_dedup(&spaced), normalize_for_dedup(&tight));
    }
}

fn doc_strategy() -> impl Strategy<Value = Document> {
    (
        prop::string::string_regex("[a-c ]{0,12}").unwrap(),
        prop::option::of("[a-b]{1,2}"),
    )
        .prop_map(|(text, id)| {
            let mut metadata = Metadata::new();
            if let Some(id) = id {
                metadata.insert("publication_id".into(), serde_json::Value::String(id));
            }
            Document::new(text, metadata)
        })
}

proptest! {
    #[test]
    fn prop_dedup_output_has_unique_fingerprints(
        docs in prop::collection::vec(doc_strategy(), 0..24),
    ) {
        let out = dedup(docs);
        let mut seen = HashSet::new();
        for doc in &out {
            let fingerprint = (normalize_for_dedup(&doc.text), identity_key(doc));
            prop_assert!(seen.insert(fingerprint), "duplicate survived dedup");
        }
    }

    #[test]
    fn prop_dedup_preserves_first_occurrence_order(
        docs in prop::collection::vec(doc_strategy(), 0..24),
    ) {
        let out = dedup(docs.clone());
        // Every surviving document appears in the input, in the same
        // relative order, and is the first of its fingerprint class.
        let mut cursor = 0;
        for doc in &out {
            let position = docs[cursor..]
                .iter()
                .position(|candidate| {
                    candidate.text == doc.text && candidate.metadata == doc.metadata
                })
                .map(|offset| cursor + offset);
            prop_assert!(position.is_some(), "survivor not found in input order");
            cursor = position.unwrap() + 1;
        }
    }
}
