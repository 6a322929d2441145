//! Text normalization for ingested documents.
//!
//! [`clean`] strips the markup noise that survives upstream conversion —
//! HTML line breaks, markdown images, admonition blocks, PDF hyphenation
//! artifacts — and canonicalizes whitespace. It is deterministic, pure, and
//! idempotent: `clean(clean(x)) == clean(x)`.
//!
//! [`normalize_for_dedup`] produces the aggressive lowercase/collapsed form
//! used for duplicate fingerprints, never for display.

use std::sync::LazyLock;

use regex::Regex;

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</br>").unwrap());
static HRULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n-{3,}\n").unwrap());
static ADMONITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):::\s*info\{[^}]*\}").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
static HYPHEN_WRAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w)-\n(\w)").unwrap());
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Cleans a raw text body. Empty input yields an empty string.
///
/// The rewrites run in a fixed order over the whole string:
///
/// 1. `<br>` variants become newlines; `---` horizontal-rule lines collapse
///    to a single newline.
/// 2. `:::info{...}` admonition markers are dropped (content kept); any
///    remaining bare `:::` token becomes a newline. The bare-token
///    replacement is a lossy approximation for malformed or nested blocks
///    and is kept as-is — downstream chunking tolerates the noise.
/// 3. Markdown images `![alt](url)` are removed entirely, alt text included.
/// 4. Line-wrapped hyphenation (`letter-\n letter`) is rejoined, mostly for
///    PDF extractions.
/// 5. Space/tab runs collapse to one space, `\r` is dropped, and 3+
///    consecutive newlines collapse to exactly 2.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = BREAK_RE.replace_all(text, "\n");
    let text = HRULE_RE.replace_all(&text, "\n");
    let text = ADMONITION_RE.replace_all(&text, "");
    let text = text.replace(":::", "\n");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = HYPHEN_WRAP_RE.replace_all(&text, "${1}${2}");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    let text = text.replace('\r', "");
    let text = NEWLINE_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Normalizes text for duplicate detection: lowercase, all whitespace runs
/// collapsed to single spaces, trimmed.
pub fn normalize_for_dedup(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}
