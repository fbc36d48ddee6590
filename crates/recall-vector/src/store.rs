//! Insertion-ordered store of embedded passages.
//!
//! A collection is append-only: there is no delete or update. Duplicate ids
//! are rejected rather than overwritten, and the vector dimensionality is
//! fixed by the first insert (or up front with [`Collection::with_dimensions`]).

use std::collections::HashMap;

use tracing::debug;

use recall_core::error::RecallError;
use recall_core::types::{CollectionStats, VectorRecord};

use crate::similarity::{check_dimensions, l2_norm};

/// Something records can be appended to and that exposes the resulting
/// in-memory collection for search.
pub trait VectorStore {
    /// Append a record. Same contract as [`Collection::add`].
    fn add_record(&mut self, record: VectorRecord) -> Result<(), RecallError>;

    /// The searchable in-memory view.
    fn collection(&self) -> &Collection;

    fn count(&self) -> usize {
        self.collection().count()
    }

    fn is_empty(&self) -> bool {
        self.collection().is_empty()
    }
}

/// A stored record together with its precomputed magnitude.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) record: VectorRecord,
    pub(crate) norm: f64,
}

/// A named, in-memory set of [`VectorRecord`]s keyed by id.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    dimensions: Option<usize>,
    entries: Vec<Entry>,
    positions: HashMap<String, usize>,
}

impl Collection {
    /// Create an empty collection whose dimensionality is fixed by the
    /// first insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: None,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Create an empty collection with a known dimensionality.
    pub fn with_dimensions(name: impl Into<String>, dimensions: usize) -> Result<Self, RecallError> {
        if dimensions == 0 {
            return Err(RecallError::InvalidArgument(
                "collection dimensions must be greater than zero".to_string(),
            ));
        }
        let mut collection = Self::new(name);
        collection.dimensions = Some(dimensions);
        Ok(collection)
    }

    /// Rebuild a collection from records in their original insertion order.
    pub fn from_records(
        name: impl Into<String>,
        records: impl IntoIterator<Item = VectorRecord>,
    ) -> Result<Self, RecallError> {
        let mut collection = Self::new(name);
        for record in records {
            collection.push(record)?;
        }
        Ok(collection)
    }

    /// Append a passage and its embedding.
    ///
    /// Fails with `DimensionMismatch` if `vector` does not match the
    /// collection's dimensionality and with `DuplicateId` if `id` is
    /// already present. A failed call leaves the collection unchanged.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
    ) -> Result<(), RecallError> {
        self.push(VectorRecord::new(id, text, vector))
    }

    /// Number of records currently held.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records in insertion order.
    pub fn all(&self) -> impl ExactSizeIterator<Item = &VectorRecord> + '_ {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&VectorRecord> {
        self.positions.get(id).map(|&pos| &self.entries[pos].record)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` until the first insert on a collection built with [`Collection::new`].
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            name: self.name.clone(),
            count: self.count(),
            dimensions: self.dimensions,
        }
    }

    /// Check that `id` and `vector` could be appended, without modifying anything.
    pub(crate) fn validate(&self, id: &str, vector: &[f32]) -> Result<(), RecallError> {
        if let Some(expected) = self.dimensions {
            check_dimensions(expected, vector.len())?;
        } else if vector.is_empty() {
            return Err(RecallError::InvalidArgument(
                "vector must not be empty".to_string(),
            ));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(RecallError::InvalidArgument(format!(
                "vector for record {} contains non-finite values",
                id
            )));
        }
        if self.positions.contains_key(id) {
            return Err(RecallError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn push(&mut self, record: VectorRecord) -> Result<(), RecallError> {
        self.validate(&record.id, &record.vector)?;

        if self.dimensions.is_none() {
            self.dimensions = Some(record.vector.len());
            debug!(
                collection = %self.name,
                dimensions = record.vector.len(),
                "Collection dimensionality fixed"
            );
        }

        let norm = l2_norm(&record.vector);
        self.positions.insert(record.id.clone(), self.entries.len());
        self.entries.push(Entry { record, norm });
        Ok(())
    }
}

impl VectorStore for Collection {
    fn add_record(&mut self, record: VectorRecord) -> Result<(), RecallError> {
        self.push(record)
    }

    fn collection(&self) -> &Collection {
        self
    }
}
