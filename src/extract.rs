//! Heuristic keyword tagging of publication text.
//!
//! Case-insensitive pattern search over four fixed vocabularies (model
//! names, tooling, datasets, metrics), plus bounded context snippets around
//! the first model- and metric-related mentions. Best-effort by design:
//! anything outside the vocabularies is a silent false negative, which is
//! acceptable for the tag-and-display purposes this serves.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Metadata;

const MODEL_PATTERNS: &[&str] = &[
    r"(?i)\bauto-encoders?\b",
    r"(?i)\bconvolutional autoencoders?\b",
    r"(?i)\btransformers?\b",
    r"(?i)\bbert\b",
    r"(?i)\bgpt[-\s]?\d+(?:\.\d+)?\b",
    r"(?i)\bmistral\b",
    r"(?i)\bllama\s?\d+\b",
];
const TOOL_PATTERNS: &[&str] = &[
    r"(?i)\bpytorch\b",
    r"(?i)\btensorflow\b",
    r"(?i)\bkeras\b",
    r"(?i)\bscikit[-\s]?learn\b",
    r"(?i)\bhuggingface\b",
    r"(?i)\bnumpy\b",
    r"(?i)\bmatplotlib\b",
];
const DATASET_PATTERNS: &[&str] = &[r"(?i)\bmnist\b", r"(?i)\bcifar-?10\b", r"(?i)\bimagenet\b"];
const METRIC_PATTERNS: &[&str] = &[r"(?i)\bmse\b", r"(?i)\bmean squared error\b"];

static MODEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(MODEL_PATTERNS));
static TOOL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(TOOL_PATTERNS));
static DATASET_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(DATASET_PATTERNS));
static METRIC_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(METRIC_PATTERNS));

static MODEL_SNIPPET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)auto-encoder|autoencoder|convolutional").unwrap());
static METRIC_SNIPPET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mse|mean squared error").unwrap());

/// Characters of context kept on each side of a snippet anchor.
const SNIPPET_WINDOW: usize = 800;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Attributes tagged from one text body. Match lists are lowercased,
/// deduplicated, and lexically sorted; snippets are empty when the anchor
/// vocabulary never matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub models_used: Vec<String>,
    pub tools_used: Vec<String>,
    pub datasets_used: Vec<String>,
    pub metrics_mentioned: Vec<String>,
    pub models_snippet: String,
    pub metrics_snippet: String,
}

impl ExtractedFields {
    /// Writes the six attribute keys into a metadata map.
    pub fn merge_into(&self, metadata: &mut Metadata) {
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(self) {
            metadata.extend(map);
        }
    }
}

/// Tags `text` against the fixed vocabularies. Empty input yields empty
/// result sets; never fails.
pub fn extract(text: &str) -> ExtractedFields {
    if text.is_empty() {
        return ExtractedFields::default();
    }
    ExtractedFields {
        models_used: find_all(&MODEL_RES, text),
        tools_used: find_all(&TOOL_RES, text),
        datasets_used: find_all(&DATASET_RES, text),
        metrics_mentioned: find_all(&METRIC_RES, text),
        models_snippet: snippet(&MODEL_SNIPPET_RE, text),
        metrics_snippet: snippet(&METRIC_SNIPPET_RE, text),
    }
}

fn find_all(patterns: &[Regex], text: &str) -> Vec<String> {
    let matches: BTreeSet<String> = patterns
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().to_lowercase())
        .collect();
    matches.into_iter().collect()
}

/// Context window around the first match of `anchor`, snapped to char
/// boundaries and trimmed.
fn snippet(anchor: &Regex, text: &str) -> String {
    let Some(m) = anchor.find(text) else {
        return String::new();
    };
    let start = floor_char_boundary(text, m.start().saturating_sub(SNIPPET_WINDOW));
    let end = ceil_char_boundary(text, (m.end() + SNIPPET_WINDOW).min(text.len()));
    text[start..end].trim().to_string()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_all_four_vocabularies() {
        let fields = extract(
            "We used PyTorch and a Transformer model, trained on MNIST, achieving MSE of 0.02",
        );
        assert_eq!(fields.tools_used, ["pytorch"]);
        assert_eq!(fields.models_used, ["transformer"]);
        assert_eq!(fields.datasets_used, ["mnist"]);
        assert_eq!(fields.metrics_mentioned, ["mse"]);
    }

    #[test]
    fn match_lists_are_deduplicated_and_sorted() {
        let fields = extract("TensorFlow beats tensorflow? Keras and NumPy and keras again.");
        assert_eq!(fields.tools_used, ["keras", "numpy", "tensorflow"]);
    }

    #[test]
    fn versioned_model_names_match() {
        let fields = extract("Compared GPT-4 against gpt 3.5 and Llama 2.");
        assert_eq!(fields.models_used, ["gpt 3.5", "gpt-4", "llama 2"]);
    }

    #[test]
    fn snippets_anchor_on_first_mention() {
        let text = format!("{} mean squared error tail", "x".repeat(1000));
        let fields = extract(&text);
        assert!(fields.metrics_snippet.contains("mean squared error"));
        assert!(fields.metrics_snippet.len() <= 2 * SNIPPET_WINDOW + "mean squared error tail".len());
        assert!(fields.models_snippet.is_empty());
    }

    #[test]
    fn snippet_window_respects_char_boundaries() {
        let text = format!("{}convolutional autoencoder", "é".repeat(600));
        let fields = extract(&text);
        assert!(fields.models_snippet.contains("convolutional"));
    }

    #[test]
    fn empty_input_yields_empty_fields() {
        assert_eq!(extract(""), ExtractedFields::default());
    }

    #[test]
    fn merge_into_writes_all_six_keys() {
        let mut metadata = Metadata::new();
        extract("PyTorch with MSE").merge_into(&mut metadata);
        assert_eq!(metadata["tools_used"], serde_json::json!(["pytorch"]));
        assert_eq!(metadata["metrics_mentioned"], serde_json::json!(["mse"]));
        assert!(metadata.contains_key("models_snippet"));
        assert!(metadata.contains_key("datasets_used"));
    }
}
