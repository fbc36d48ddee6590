//! Shared data types for the retrieval core.

use serde::{Deserialize, Serialize};

/// A single embedded passage.
///
/// `text` is the passage the vector was computed from and never changes once
/// stored. All records in one collection share the same vector length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique within a collection.
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            vector,
        }
    }

    /// Vector dimensionality.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// One ranked hit from a similarity search.
///
/// Borrows `id` and `text` from the collection that produced it; convert with
/// [`ScoredResult::to_passage`] to keep it past the collection borrow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredResult<'a> {
    pub id: &'a str,
    pub text: &'a str,
    /// Cosine similarity in [-1, 1].
    pub score: f64,
}

impl ScoredResult<'_> {
    pub fn to_passage(&self) -> RetrievedPassage {
        RetrievedPassage {
            id: self.id.to_string(),
            text: self.text.to_string(),
            score: self.score,
        }
    }
}

/// Owned form of [`ScoredResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub id: String,
    pub text: String,
    pub score: f64,
}

impl From<ScoredResult<'_>> for RetrievedPassage {
    fn from(result: ScoredResult<'_>) -> Self {
        result.to_passage()
    }
}

/// Summary of a collection, as shown by `recall stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub count: usize,
    /// `None` until the first record fixes the dimensionality.
    pub dimensions: Option<usize>,
}
