//! Embedding collaborator seam.
//!
//! The pipeline never computes vectors itself: it hands chunk texts to an
//! [`Embedder`] and stores whatever comes back. [`MockEmbedder`] is the
//! deterministic, dependency-free implementation used throughout the test
//! suite; production callers plug in a real model behind the same trait.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::types::IngestError;

/// Batch text-to-vector interface. Implementations must be deterministic
/// for a fixed `id` so that rebuilt indexes are reproducible.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier of the underlying model.
    fn id(&self) -> &str;

    /// Embeds a batch of texts, optionally L2-normalizing each vector.
    async fn embed(&self, texts: &[String], normalize: bool)
    -> Result<Vec<Vec<f32>>, IngestError>;
}

/// Hash-seeded embedder: same text, same vector, no model download.
#[derive(Clone, Debug)]
pub struct MockEmbedder {
    dims: usize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self { dims: 16 }
    }

    #[must_use]
    pub fn with_dims(mut self, dims: usize) -> Self {
        self.dims = dims;
        self
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn id(&self) -> &str {
        "mock-embedder"
    }

    async fn embed(
        &self,
        texts: &[String],
        normalize: bool,
    ) -> Result<Vec<Vec<f32>>, IngestError> {
        Ok(texts
            .iter()
            .map(|text| hash_to_vec(text, self.dims, normalize))
            .collect())
    }
}

fn hash_to_vec(text: &str, dims: usize, normalize: bool) -> Vec<f32> {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();

    let mut vector: Vec<f32> = (0..dims)
        .map(|i| {
            let bits = seed.rotate_left((i as u32 * 7) % 64) ^ ((i as u64) << 24);
            (bits as f64 / u64::MAX as f64) as f32
        })
        .collect();
    if normalize {
        l2_normalize(&mut vector);
    }
    vector
}

/// Scales a vector to unit length; zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
