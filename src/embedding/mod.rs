//! Embedding capability: batch text encoding and cosine similarity

use crate::error::{Result, SkillGapError};
use model2vec_rs::model::StaticModel;
use std::path::Path;

/// A frozen embedding model consumed as a black box.
///
/// Implementations must be deterministic for a fixed model and return
/// vectors of a fixed dimensionality across all calls. Batch calls are
/// preferred over per-item calls for throughput.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts into embedding vectors, one per input.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Encode a single text.
    fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| SkillGapError::Embedding("empty batch result".to_string()))
    }
}

/// Embedder backed by a local Model2Vec static model.
pub struct Model2VecEmbedder {
    model: StaticModel,
}

impl Model2VecEmbedder {
    pub fn new(model_path: &Path) -> Result<Self> {
        log::info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| SkillGapError::Embedding(format!("Failed to load model: {}", e)))?;

        Ok(Self { model })
    }
}

impl Embedder for Model2VecEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }
}

/// Cosine similarity between two vectors of the same dimensionality.
///
/// A small epsilon in the denominator keeps zero vectors at similarity 0
/// instead of NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / (norm_a * norm_b + 1e-8)
}
