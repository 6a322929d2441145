//! Run configuration for index builds.
//!
//! One YAML file carries base settings plus an optional `datasets:` section
//! whose per-dataset subtree deep-merges over the base (dataset wins). A
//! missing or unparsable config file is fatal — nothing has been processed
//! yet, so aborting is cheap and unambiguous.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::pipeline::DatasetKind;
use crate::types::IngestError;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EmbeddingSettings {
    /// Identifier of the embedding model handed to the collaborator.
    pub model_name: String,
    /// Whether vectors are L2-normalized at embed time.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_normalize() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VectorStoreSettings {
    /// Root directory for persisted indexes; each dataset gets a
    /// subdirectory beneath it.
    pub path: PathBuf,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RunConfig {
    pub embeddings: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
}

/// Loads the config for one dataset: base settings with the dataset's
/// `datasets.<kind>` subtree merged on top.
pub async fn load_config(path: &Path, dataset: DatasetKind) -> Result<RunConfig, IngestError> {
    let raw = fs::read_to_string(path).await.map_err(|err| {
        IngestError::Config(format!("cannot read config {}: {err}", path.display()))
    })?;
    let root: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(|err| {
        IngestError::Config(format!("cannot parse config {}: {err}", path.display()))
    })?;

    let overlay = root
        .get("datasets")
        .and_then(|datasets| datasets.get(dataset.as_str()))
        .cloned();

    let mut base = root;
    if let Some(mapping) = base.as_mapping_mut() {
        mapping.remove(&serde_yaml::Value::String("datasets".into()));
    }
    if let Some(overlay) = overlay {
        deep_merge(&mut base, overlay);
    }

    serde_yaml::from_value(base).map_err(|err| {
        IngestError::Config(format!("invalid config {}: {err}", path.display()))
    })
}

/// Recursively merges `overlay` into `base`; non-mapping values replace.
fn deep_merge(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.entry(key) {
                    serde_yaml::mapping::Entry::Occupied(mut slot) => {
                        deep_merge(slot.get_mut(), value);
                    }
                    serde_yaml::mapping::Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
        }
        (base_slot, value) => *base_slot = value,
    }
}
