//! Embedding service trait and implementations.
//!
//! Real providers are hosted models reached over the network; Recall only
//! defines the contract they must meet. `HashEmbedding` provides
//! deterministic hash-based vectors so the CLI and tests run offline.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;

use recall_core::error::RecallError;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors. Called once
/// per document at ingestion and once per query at search time. Failures
/// are reported as `RecallError::Provider` and never retried by Recall.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, RecallError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// Because `EmbeddingService::embed` returns `impl Future` it is not
/// object-safe. This trait uses a boxed future instead, allowing
/// `Box<dyn DynEmbeddingService>` to be chosen at runtime from configuration.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RecallError>> + Send + 'a>>;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RecallError>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

impl EmbeddingService for Box<dyn DynEmbeddingService> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        self.as_ref().embed_boxed(text).await
    }

    fn dimensions(&self) -> usize {
        self.as_ref().dimensions()
    }
}

/// Check a provider response once, at the boundary.
///
/// The vector must have exactly `expected` finite components.
pub fn validate_embedding(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>, RecallError> {
    if vector.len() != expected {
        return Err(RecallError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(RecallError::Provider(
            "embedding contains non-finite values".to_string(),
        ));
    }
    Ok(vector)
}

/// Build the embedding service named by the configuration.
pub fn from_config(
    config: &recall_core::config::EmbeddingConfig,
) -> Result<Box<dyn DynEmbeddingService>, RecallError> {
    match config.provider.as_str() {
        "hash" => Ok(Box::new(HashEmbedding::new(config.dimensions)?)),
        other => Err(RecallError::Config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// HashEmbedding - deterministic hash-based vectors
// ---------------------------------------------------------------------------

/// Embedding service that returns deterministic, L2-normalised vectors.
///
/// The output is derived from a hash of the input text, so identical inputs
/// always produce identical outputs. Distinct texts map to unrelated
/// directions; there is no semantic similarity between them.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dimensions: usize,
}

impl HashEmbedding {
    pub fn new(dimensions: usize) -> Result<Self, RecallError> {
        if dimensions == 0 {
            return Err(RecallError::InvalidArgument(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

impl EmbeddingService for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        if text.trim().is_empty() {
            return Err(RecallError::Provider("Cannot embed empty text".to_string()));
        }
        Ok(self.hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
