//! A collection mirrored to SQLite.
//!
//! Reads and searches go through the in-memory [`Collection`]; every insert
//! is validated in memory, written to the database, then applied in memory,
//! so the two never disagree after a failed call.

use std::sync::Arc;

use tracing::info;

use recall_core::error::RecallError;
use recall_core::types::{CollectionStats, VectorRecord};
use recall_storage::{CollectionRepository, Database};

use crate::store::{Collection, VectorStore};

/// Named collection backed by a [`CollectionRepository`].
#[derive(Debug)]
pub struct PersistentCollection {
    repo: CollectionRepository,
    inner: Collection,
}

impl PersistentCollection {
    /// Open the named collection, creating it if needed and loading any
    /// previously stored records in insertion order.
    pub fn open(db: Arc<Database>, name: &str) -> Result<Self, RecallError> {
        let location = db
            .path()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
        let repo = CollectionRepository::new(db);
        let stored = repo.get_or_create(name)?;

        let records = repo.load_all(name)?;
        let inner = match stored.dimensions {
            Some(dimensions) => {
                let mut collection = Collection::with_dimensions(name, dimensions)?;
                for record in records {
                    collection.add_record(record)?;
                }
                collection
            }
            None => Collection::from_records(name, records)?,
        };

        info!(
            collection = name,
            database = %location,
            count = inner.count(),
            dimensions = ?inner.dimensions(),
            "Collection opened"
        );

        Ok(Self { repo, inner })
    }

    /// Append a passage and its embedding, persisting it first.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
    ) -> Result<(), RecallError> {
        self.add_record(VectorRecord::new(id, text, vector))
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Every collection stored in the same database, ordered by name.
    pub fn catalog(&self) -> Result<Vec<CollectionStats>, RecallError> {
        self.repo
            .list()?
            .into_iter()
            .map(|info| {
                Ok(CollectionStats {
                    count: self.repo.count(&info.name)?,
                    name: info.name,
                    dimensions: info.dimensions,
                })
            })
            .collect()
    }
}

impl VectorStore for PersistentCollection {
    fn add_record(&mut self, record: VectorRecord) -> Result<(), RecallError> {
        self.inner.validate(&record.id, &record.vector)?;
        self.repo.insert(self.inner.name(), &record)?;
        self.inner.add_record(record)
    }

    fn collection(&self) -> &Collection {
        &self.inner
    }
}
