//! Exact top-k retrieval by cosine similarity.
//!
//! Every query is a full linear scan over the collection, O(n·D). Record
//! magnitudes are cached by the store, so only the query norm is computed
//! per call.

use tracing::debug;

use recall_core::error::RecallError;
use recall_core::types::ScoredResult;

use crate::similarity::{check_dimensions, cosine_with_norms, l2_norm};
use crate::store::Collection;

/// Read-only ranking view over a [`Collection`].
///
/// Holds no state besides the borrow; each search is independent.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalIndex<'a> {
    collection: &'a Collection,
}

impl<'a> RetrievalIndex<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self { collection }
    }

    /// Return the `k` records most similar to `query`, best first.
    ///
    /// The result holds `min(k, count())` entries. Equal scores keep the
    /// order in which the records were inserted. Fails with
    /// `InvalidArgument` when `k` is zero and with `DimensionMismatch` when
    /// the query length differs from a non-empty collection's dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredResult<'a>>, RecallError> {
        self.rank(query, k, None)
    }

    /// Like [`RetrievalIndex::search`], but drops results scoring below
    /// `min_score`.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: f64,
    ) -> Result<Vec<ScoredResult<'a>>, RecallError> {
        self.rank(query, k, Some(min_score))
    }

    pub fn collection(&self) -> &'a Collection {
        self.collection
    }

    fn rank(
        &self,
        query: &[f32],
        k: usize,
        min_score: Option<f64>,
    ) -> Result<Vec<ScoredResult<'a>>, RecallError> {
        if k == 0 {
            return Err(RecallError::InvalidArgument(
                "k must be greater than zero".to_string(),
            ));
        }

        let Some(dimensions) = self.collection.dimensions() else {
            return Ok(Vec::new());
        };
        if self.collection.is_empty() {
            return Ok(Vec::new());
        }
        check_dimensions(dimensions, query.len())?;
        if query.iter().any(|v| !v.is_finite()) {
            return Err(RecallError::InvalidArgument(
                "query vector contains non-finite values".to_string(),
            ));
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<ScoredResult<'a>> = self
            .collection
            .entries()
            .iter()
            .map(|entry| ScoredResult {
                id: entry.record.id.as_str(),
                text: entry.record.text.as_str(),
                score: cosine_with_norms(query, query_norm, &entry.record.vector, entry.norm),
            })
            .filter(|hit| min_score.map_or(true, |min| hit.score >= min))
            .collect();

        // `sort_by` is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(
            collection = %self.collection.name(),
            candidates = self.collection.count(),
            returned = scored.len(),
            k,
            "Similarity search complete"
        );

        Ok(scored)
    }
}
