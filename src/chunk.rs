//! Profile-driven chunking of documents into bounded, overlapping windows.
//!
//! The splitter is recursive: it cuts on the most structurally significant
//! separator present in the text and only falls back to finer separators
//! for pieces that still exceed the size budget, then greedily merges
//! adjacent pieces back into windows, carrying a fixed overlap of trailing
//! context between consecutive windows of the same document.
//!
//! Sizes and overlaps are measured in characters. Chunks inherit their
//! source document's metadata unchanged; a post-filter drops any chunk of
//! 30 words or fewer.

use crate::types::Document;

/// Minimum word count (exclusive) for an emitted chunk.
const MIN_CHUNK_WORDS: usize = 30;

const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];
const HEADING_SEPARATORS: &[&str] = &["\n# ", "\n## ", "\n", " "];

/// Windowing profile per dataset kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkProfile {
    /// 1200-char windows, 150 overlap, paragraph-first separators.
    Publications,
    /// 800-char windows, 120 overlap, heading-first separators.
    Docs,
    /// 1000-char windows, 150 overlap, paragraph-first separators.
    Wikipedia,
}

impl ChunkProfile {
    pub fn window_size(self) -> usize {
        match self {
            ChunkProfile::Publications => 1200,
            ChunkProfile::Docs => 800,
            ChunkProfile::Wikipedia => 1000,
        }
    }

    pub fn overlap(self) -> usize {
        match self {
            ChunkProfile::Publications => 150,
            ChunkProfile::Docs => 120,
            ChunkProfile::Wikipedia => 150,
        }
    }

    pub fn separators(self) -> &'static [&'static str] {
        match self {
            ChunkProfile::Docs => HEADING_SEPARATORS,
            _ => DEFAULT_SEPARATORS,
        }
    }

    fn splitter(self) -> RecursiveSplitter {
        RecursiveSplitter::new(self.window_size(), self.overlap(), self.separators())
    }
}

/// Recursive character splitter with overlap carry-forward.
#[derive(Clone, Debug)]
pub struct RecursiveSplitter {
    size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(size: usize, overlap: usize, separators: &[&str]) -> Self {
        Self {
            size,
            overlap,
            separators: separators.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Splits `text` into windows of at most `size` characters where the
    /// separator hierarchy allows it. A piece that no separator can break
    /// further (e.g. an unbroken token longer than the budget with no
    /// empty-string fallback) is emitted oversized rather than dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);
        let pieces = split_keeping_separator(text, &separator);

        let mut windows = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                windows.extend(self.merge(std::mem::take(&mut pending)));
            }
            if rest.is_empty() {
                windows.push(piece.trim().to_string());
            } else {
                windows.extend(self.split_recursive(&piece, rest));
            }
        }
        if !pending.is_empty() {
            windows.extend(self.merge(pending));
        }
        windows.retain(|w| !w.is_empty());
        windows
    }

    /// Greedily packs pieces into windows within the size budget, then
    /// seeds each following window with up to `overlap` trailing characters
    /// of the previous one.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if total + piece_len > self.size && !current.is_empty() {
                windows.push(current.concat().trim().to_string());
                while total > self.overlap
                    || (total + piece_len > self.size && total > 0)
                {
                    total -= char_len(&current[0]);
                    current.remove(0);
                }
            }
            total += piece_len;
            current.push(piece);
        }
        if !current.is_empty() {
            windows.push(current.concat().trim().to_string());
        }
        windows.retain(|w| !w.is_empty());
        windows
    }
}

/// First separator that occurs in `text` (or the empty-string fallback),
/// plus the finer separators to recurse with.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (String, &'a [String]) {
    for (index, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (String::new(), &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.clone(), &separators[index + 1..]);
        }
    }
    // Nothing matched: the coarsest remaining cut is the whole text.
    (separators.last().cloned().unwrap_or_default(), &[])
}

/// Splits at each separator occurrence, keeping the separator at the head
/// of the piece it introduces so structural markers (headings, paragraph
/// breaks) stay with their content. An empty separator splits into single
/// characters, the last-resort granularity.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut cuts: Vec<usize> = text
        .match_indices(separator)
        .map(|(index, _)| index)
        .filter(|index| *index != 0)
        .collect();
    cuts.push(text.len());

    let mut pieces = Vec::with_capacity(cuts.len());
    let mut previous = 0;
    for cut in cuts {
        if cut > previous {
            pieces.push(text[previous..cut].to_string());
        }
        previous = cut;
    }
    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Chunks every document under the given profile. Chunks inherit the
/// source metadata unchanged; chunks of 30 words or fewer are dropped.
pub fn chunk_documents(docs: &[Document], profile: ChunkProfile) -> Vec<Document> {
    let splitter = profile.splitter();
    let mut chunks = Vec::new();
    for doc in docs {
        for window in splitter.split(&doc.text) {
            if window.split_whitespace().count() <= MIN_CHUNK_WORDS {
                continue;
            }
            chunks.push(Document::new(window, doc.metadata.clone()));
        }
    }
    chunks
}
