//! Vector index seam and the bundled brute-force implementation.
//!
//! [`VectorStore`] abstracts over nearest-neighbor backends so the pipeline
//! is not tied to one library. [`FlatIndex`] is the reference backend: an
//! exhaustive cosine scan over an in-memory table with a JSON snapshot on
//! disk. Exact, dependency-free, and plenty for corpora in the tens of
//! thousands of chunks; swap in an ANN-backed store behind the same trait
//! when scale demands it.
//!
//! [`persist_chunks`] writes the newline-delimited `{"text", "metadata"}`
//! audit file that accompanies an index.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::embeddings::Embedder;
use crate::types::{Document, IngestError};

/// Snapshot file name inside an index directory.
const INDEX_FILE: &str = "index.json";

/// Storage backend for embedded chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts documents paired with their embeddings.
    async fn add_documents(
        &mut self,
        entries: Vec<(Document, Vec<f32>)>,
    ) -> Result<(), IngestError>;

    /// Returns the `top_k` nearest documents with their similarity scores,
    /// most similar first.
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<(Document, f32)>, IngestError>;

    /// Number of stored entries.
    fn count(&self) -> usize;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct IndexEntry {
    id: String,
    embedding: Vec<f32>,
    document: Document,
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    embedding_model: String,
    normalize: bool,
    entries: Vec<IndexEntry>,
}

/// Brute-force cosine index with JSON persistence.
#[derive(Clone)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn Embedder>,
    normalize: bool,
}

impl FlatIndex {
    pub fn new(embedder: Arc<dyn Embedder>, normalize: bool) -> Self {
        Self {
            entries: Vec::new(),
            embedder,
            normalize,
        }
    }

    /// Writes the index snapshot into `dir` (created if needed).
    pub async fn save(&self, dir: &Path) -> Result<(), IngestError> {
        fs::create_dir_all(dir).await?;
        let snapshot = IndexSnapshot {
            embedding_model: self.embedder.id().to_string(),
            normalize: self.normalize,
            entries: self.entries.clone(),
        };
        let serialized = serde_json::to_string(&snapshot)
            .map_err(|err| IngestError::Index(err.to_string()))?;
        fs::write(dir.join(INDEX_FILE), serialized).await?;
        Ok(())
    }

    /// Loads a snapshot from `dir`, attaching the embedder used for query
    /// embedding. A model-id mismatch is logged, not fatal: scores will be
    /// meaningless, but the caller may only need the stored documents.
    pub async fn load(
        dir: &Path,
        embedder: Arc<dyn Embedder>,
        normalize: bool,
    ) -> Result<Self, IngestError> {
        let raw = fs::read_to_string(dir.join(INDEX_FILE)).await?;
        let snapshot: IndexSnapshot =
            serde_json::from_str(&raw).map_err(|err| IngestError::Index(err.to_string()))?;
        if snapshot.embedding_model != embedder.id() {
            warn!(
                stored = %snapshot.embedding_model,
                attached = %embedder.id(),
                "index was built with a different embedding model"
            );
        }
        Ok(Self {
            entries: snapshot.entries,
            embedder,
            normalize,
        })
    }

    /// Embeds `query` and returns the `top_k` nearest documents.
    pub async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Document>, IngestError> {
        let vectors = self
            .embedder
            .embed(&[query.to_string()], self.normalize)
            .await?;
        let query_vec = vectors
            .into_iter()
            .next()
            .ok_or_else(|| IngestError::Embedding("embedder returned no vectors".into()))?;
        let scored = self.search(&query_vec, top_k).await?;
        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }
}

#[async_trait]
impl VectorStore for FlatIndex {
    async fn add_documents(
        &mut self,
        entries: Vec<(Document, Vec<f32>)>,
    ) -> Result<(), IngestError> {
        for (document, embedding) in entries {
            if embedding.is_empty() {
                return Err(IngestError::Index("empty embedding vector".into()));
            }
            self.entries.push(IndexEntry {
                id: Uuid::new_v4().to_string(),
                embedding,
                document,
            });
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<(Document, f32)>, IngestError> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, cosine_similarity(query, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored
            .into_iter()
            .map(|(index, score)| (self.entries[index].document.clone(), score))
            .collect())
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Persists one `{"text": ..., "metadata": ...}` JSON record per chunk,
/// newline-delimited, creating parent directories as needed.
pub async fn persist_chunks(chunks: &[Document], path: &Path) -> Result<(), IngestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let mut out = String::new();
    for chunk in chunks {
        let line =
            serde_json::to_string(chunk).map_err(|err| IngestError::Parse(err.to_string()))?;
        out.push_str(&line);
        out.push('\n');
    }
    fs::write(path, out).await?;
    Ok(())
}
