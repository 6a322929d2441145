//! End-to-end drive of the ingestion pipeline.
//!
//! [`IngestPipeline::run`] executes load → dedup → chunk → embed → index →
//! persist for one dataset, logging counts at every stage.
//! [`IndexBuilder`] covers the tail of that sequence for callers that bring
//! their own documents. Embedding and index construction stay behind the
//! [`Embedder`] and [`FlatIndex`] seams; this module only sequences them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunk::{ChunkProfile, chunk_documents};
use crate::config::RunConfig;
use crate::dedup::dedup;
use crate::embeddings::Embedder;
use crate::field_map::{FieldMap, load_overrides};
use crate::index::{FlatIndex, VectorStore, persist_chunks};
use crate::loaders::{WebLoader, WikipediaLoader, load_dir, load_records};
use crate::types::{Document, IngestError};

/// The three ingestable dataset kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Publications,
    Docs,
    Wikipedia,
}

impl DatasetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Publications => "publications",
            DatasetKind::Docs => "docs",
            DatasetKind::Wikipedia => "wikipedia",
        }
    }

    pub fn chunk_profile(self) -> ChunkProfile {
        match self {
            DatasetKind::Publications => ChunkProfile::Publications,
            DatasetKind::Docs => ChunkProfile::Docs,
            DatasetKind::Wikipedia => ChunkProfile::Wikipedia,
        }
    }
}

impl FromStr for DatasetKind {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "publications" => Ok(DatasetKind::Publications),
            "docs" => Ok(DatasetKind::Docs),
            "wikipedia" => Ok(DatasetKind::Wikipedia),
            other => Err(IngestError::Config(format!(
                "unknown dataset kind '{other}' (expected publications | docs | wikipedia)"
            ))),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input locations for one run. Only the fields relevant to the chosen
/// dataset kind are consulted.
#[derive(Clone, Debug)]
pub struct IngestOptions {
    /// Publications: JSON/JSONL file or directory of records.
    pub publications_json: Option<PathBuf>,
    /// Publications fallback: directory of PDF/MD/TXT files.
    pub publications_dir: Option<PathBuf>,
    /// Optional field-map override file (YAML or JSON).
    pub field_map: Option<PathBuf>,
    /// Docs: newline-delimited URL list.
    pub docs_urls: Option<PathBuf>,
    /// Wikipedia: newline-delimited title list.
    pub wiki_titles: Option<PathBuf>,
    /// Wikipedia language code.
    pub wiki_lang: String,
    /// Whether to write the chunks.jsonl audit file.
    pub save_chunks: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            publications_json: None,
            publications_dir: None,
            field_map: None,
            docs_urls: None,
            wiki_titles: None,
            wiki_lang: "en".into(),
            save_chunks: true,
        }
    }
}

/// Counts reported after a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub loaded: usize,
    pub after_dedup: usize,
    pub chunks: usize,
}

/// Drives embedding, index construction and persistence, and the chunk
/// audit file for one batch of chunks. Both heavy steps stay behind their
/// collaborator seams; this type only sequences them.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    normalize: bool,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, normalize: bool) -> Self {
        Self {
            embedder,
            normalize,
        }
    }

    /// Embeds the chunks, builds and saves the index under `destination`,
    /// then writes the chunks.jsonl audit file. Audit persistence runs
    /// after the index save and its failure is logged, never propagated —
    /// the saved index is the completion signal.
    pub async fn build(
        &self,
        chunks: &[Document],
        destination: &Path,
        save_chunks: bool,
    ) -> Result<FlatIndex, IngestError> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.embed(&texts, self.normalize).await?;
        if vectors.len() != chunks.len() {
            return Err(IngestError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let mut index = FlatIndex::new(Arc::clone(&self.embedder), self.normalize);
        index
            .add_documents(chunks.iter().cloned().zip(vectors).collect())
            .await?;
        index.save(destination).await?;
        info!(dir = %destination.display(), count = index.count(), "index saved");

        if save_chunks {
            let chunks_path = destination.join("chunks.jsonl");
            match persist_chunks(chunks, &chunks_path).await {
                Ok(()) => info!(path = %chunks_path.display(), "saved chunk metadata"),
                Err(err) => warn!(%err, "failed to persist chunk metadata"),
            }
        }

        Ok(index)
    }
}

/// Sequences one dataset's ingestion under a fixed config and embedder.
pub struct IngestPipeline {
    config: RunConfig,
    embedder: Arc<dyn Embedder>,
}

impl IngestPipeline {
    pub fn new(config: RunConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self { config, embedder }
    }

    /// Runs the full pipeline for `dataset`, returning stage counts and
    /// leaving a saved index (plus optional chunks.jsonl) under the
    /// configured output root. A successful index save is the sole
    /// completion signal; an interrupted run leaves no usable index.
    pub async fn run(
        &self,
        dataset: DatasetKind,
        options: &IngestOptions,
    ) -> Result<IngestStats, IngestError> {
        let docs = self.load(dataset, options).await?;
        let loaded = docs.len();
        info!(dataset = %dataset, count = loaded, "loaded raw docs/sections");

        let docs = dedup(docs);
        let after_dedup = docs.len();
        info!(dataset = %dataset, count = after_dedup, "docs/sections after dedup");

        let chunks = chunk_documents(&docs, dataset.chunk_profile());
        info!(dataset = %dataset, count = chunks.len(), "created chunks");

        let out_dir = self.config.vector_store.path.join(dataset.as_str());
        let builder = IndexBuilder::new(
            Arc::clone(&self.embedder),
            self.config.embeddings.normalize,
        );
        builder.build(&chunks, &out_dir, options.save_chunks).await?;

        Ok(IngestStats {
            loaded,
            after_dedup,
            chunks: chunks.len(),
        })
    }

    async fn load(
        &self,
        dataset: DatasetKind,
        options: &IngestOptions,
    ) -> Result<Vec<Document>, IngestError> {
        match dataset {
            DatasetKind::Publications => {
                if let Some(json_path) = &options.publications_json {
                    let map = match &options.field_map {
                        Some(path) => FieldMap::with_overrides(load_overrides(path).await?),
                        None => FieldMap::default(),
                    };
                    load_records(json_path, &map).await
                } else if let Some(dir) = &options.publications_dir {
                    load_dir(dir).await
                } else {
                    Err(IngestError::Config(
                        "publications need a records path or a raw file directory".into(),
                    ))
                }
            }
            DatasetKind::Docs => {
                let urls = options.docs_urls.as_ref().ok_or_else(|| {
                    IngestError::Config("docs need a URL list file".into())
                })?;
                WebLoader::new()?.load(urls).await
            }
            DatasetKind::Wikipedia => {
                let titles = options.wiki_titles.as_ref().ok_or_else(|| {
                    IngestError::Config("wikipedia needs a title list file".into())
                })?;
                WikipediaLoader::new(options.wiki_lang.as_str())?
                    .load(titles)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_kind_parses_known_names_only() {
        assert_eq!(
            "publications".parse::<DatasetKind>().unwrap(),
            DatasetKind::Publications
        );
        assert_eq!("docs".parse::<DatasetKind>().unwrap(), DatasetKind::Docs);
        assert_eq!(
            "wikipedia".parse::<DatasetKind>().unwrap(),
            DatasetKind::Wikipedia
        );
        assert!(matches!(
            "arxiv".parse::<DatasetKind>(),
            Err(IngestError::Config(_))
        ));
    }

    #[test]
    fn dataset_kind_maps_to_its_chunk_profile() {
        assert_eq!(
            DatasetKind::Publications.chunk_profile(),
            ChunkProfile::Publications
        );
        assert_eq!(DatasetKind::Docs.chunk_profile(), ChunkProfile::Docs);
        assert_eq!(
            DatasetKind::Wikipedia.chunk_profile(),
            ChunkProfile::Wikipedia
        );
    }
}
