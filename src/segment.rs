//! Divider- and heading-driven segmentation of free-text bodies.
//!
//! Publication descriptions arrive as one markdown-ish field holding several
//! logical sections separated by `DIVIDER` markers. [`segment`] turns that
//! field into discrete titled sections, cleaning each body on the way out.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::clean;

static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-*DIVIDER-*\s*").unwrap());
static DIVIDER_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n?DIVIDER\n?").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+(.+)$").unwrap());

/// One titled section extracted from a multi-section text field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// Unifies divider-marker variants (dash-padded forms and the literal
/// `--DIVIDER--`) into a canonical newline-bounded `DIVIDER` token.
fn normalize_dividers(text: &str) -> String {
    let text = DIVIDER_RE.replace_all(text, "\nDIVIDER\n");
    text.replace("--DIVIDER--", "\nDIVIDER\n")
}

/// Splits `markdown` into titled sections.
///
/// Parts are delimited by `DIVIDER` markers. Within each part, the first
/// markdown heading line (`#` through `######`) becomes the section title
/// and that one heading line is removed from the body so the title is not
/// duplicated inside it; parts without a heading are titled
/// `Section {1-based index}`. Bodies are cleaned with
/// [`clean`](crate::normalize::clean) and sections with fewer than 5 words
/// are dropped. Part order is preserved.
pub fn segment(markdown: &str) -> Vec<Section> {
    if markdown.is_empty() {
        return Vec::new();
    }
    let normalized = normalize_dividers(markdown);
    let parts: Vec<&str> = DIVIDER_SPLIT_RE
        .split(&normalized)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let mut sections = Vec::new();
    for (index, part) in parts.iter().enumerate() {
        let (title, body) = match HEADING_RE.captures(part) {
            Some(caps) => (
                caps[1].trim().to_string(),
                // Only the first heading line is removed; later headings
                // stay in the body.
                HEADING_RE.replace(part, "").into_owned(),
            ),
            None => (format!("Section {}", index + 1), (*part).to_string()),
        };
        let body = clean(&body);
        if body.split_whitespace().count() < 5 {
            continue;
        }
        sections.push(Section { title, body });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_divider_and_takes_heading_titles() {
        let input = "# Title A\nfoo bar baz one two\nDIVIDER\n# Title B\nalpha beta gamma delta epsilon";
        let sections = segment(input);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Title A");
        assert_eq!(sections[0].body, "foo bar baz one two");
        assert_eq!(sections[1].title, "Title B");
        assert_eq!(sections[1].body, "alpha beta gamma delta epsilon");
    }

    #[test]
    fn handles_dash_padded_divider_variants() {
        let input = "one two three four five--DIVIDER--six seven eight nine ten";
        let sections = segment(input);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "one two three four five");
        assert_eq!(sections[1].body, "six seven eight nine ten");
    }

    #[test]
    fn divider_matching_is_case_insensitive() {
        let input = "one two three four five\ndivider\nsix seven eight nine ten";
        assert_eq!(segment(input).len(), 2);
    }

    #[test]
    fn untitled_parts_get_positional_titles() {
        let input = "first part with five words\nDIVIDER\nsecond part with five words";
        let sections = segment(input);
        assert_eq!(sections[0].title, "Section 1");
        assert_eq!(sections[1].title, "Section 2");
    }

    #[test]
    fn drops_sections_under_five_words() {
        let input = "# Short\ntoo few\nDIVIDER\n# Long Enough\nthis body has five words";
        let sections = segment(input);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Long Enough");
    }

    #[test]
    fn image_only_parts_are_dropped() {
        let input = "![figure](fig.png)\nDIVIDER\nreal content with enough words here";
        let sections = segment(input);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn only_first_heading_is_removed_from_body() {
        let input = "# Outer\nwords before\n## Inner\nand some more words";
        let sections = segment(input);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Outer");
        assert!(sections[0].body.contains("## Inner"));
    }

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(segment("").is_empty());
        assert!(segment("   \n ").is_empty());
    }
}
