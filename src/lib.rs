//! ```text
//! Structured records ──► loaders::records ─┐   (field_map, extract,
//! PDF / MD / TXT dirs ─► loaders::files   ──┤    segment, normalize)
//! URL lists ───────────► loaders::web     ──┼─► Vec<Document>
//! Title lists ─────────► loaders::wiki    ──┘        │
//!                                                    ▼
//!                                          dedup ──► chunk
//!                                                    │
//!                              embeddings::Embedder ─┤
//!                                                    ▼
//!                 chunks.jsonl ◄── pipeline ──► index::FlatIndex
//! ```
//!
//! Ingestion-to-index pipeline for heterogeneous document collections:
//! structured publication records, web pages, encyclopedia articles, and
//! raw file trees are cleaned, segmented, deduplicated, chunked, embedded,
//! and persisted as a searchable vector index plus a JSONL audit trail.
//!
//! The embedding model and the nearest-neighbor index are collaborators
//! behind seams ([`embeddings::Embedder`], [`index::VectorStore`]); the
//! bundled [`embeddings::MockEmbedder`] and [`index::FlatIndex`] make the
//! whole pipeline exercisable offline.

pub mod chunk;
pub mod config;
pub mod dedup;
pub mod embeddings;
pub mod extract;
pub mod field_map;
pub mod index;
pub mod loaders;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod types;

pub use types::{Document, IngestError, Metadata};
