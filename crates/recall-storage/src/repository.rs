//! SQLite-backed persistence for named vector collections.
//!
//! Rows are normalised into [`VectorRecord`] at this boundary so callers never
//! see raw BLOBs or column tuples.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension};
use tracing::debug;

use recall_core::error::RecallError;
use recall_core::types::VectorRecord;

use crate::db::Database;

/// Stored metadata for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    /// `None` until the first record is inserted.
    pub dimensions: Option<usize>,
}

/// Repository for collections and their records.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    db: Arc<Database>,
}

impl CollectionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fetch a collection by name, creating it if it does not exist.
    pub fn get_or_create(&self, name: &str) -> Result<CollectionInfo, RecallError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO collections (name, dimensions, created_at)
                 VALUES (?1, NULL, ?2)",
                rusqlite::params![name, Utc::now().timestamp()],
            )
            .map_err(|e| RecallError::Storage(format!("Failed to create collection: {}", e)))?;

            let dimensions: Option<i64> = conn
                .query_row(
                    "SELECT dimensions FROM collections WHERE name = ?1",
                    rusqlite::params![name],
                    |row| row.get(0),
                )
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            Ok(CollectionInfo {
                name: name.to_string(),
                dimensions: dimensions.map(|d| d as usize),
            })
        })
    }

    /// All stored collections, ordered by name.
    pub fn list(&self) -> Result<Vec<CollectionInfo>, RecallError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT name, dimensions FROM collections ORDER BY name")
                .map_err(|e| RecallError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    let dimensions: Option<i64> = row.get(1)?;
                    Ok(CollectionInfo {
                        name: row.get(0)?,
                        dimensions: dimensions.map(|d| d as usize),
                    })
                })
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            let collections = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| RecallError::Storage(e.to_string()))?;
            Ok(collections)
        })
    }

    /// Append a record to a collection.
    ///
    /// Fixes the collection's dimensionality on first insert. Fails with
    /// `DuplicateId` if the id is already stored and `DimensionMismatch` if
    /// the vector disagrees with the stored dimensionality.
    pub fn insert(&self, collection: &str, record: &VectorRecord) -> Result<(), RecallError> {
        let blob = encode_vector(&record.vector);

        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            let stored: Option<Option<i64>> = tx
                .query_row(
                    "SELECT dimensions FROM collections WHERE name = ?1",
                    rusqlite::params![collection],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            match stored {
                None => {
                    return Err(RecallError::Storage(format!(
                        "Unknown collection: {}",
                        collection
                    )))
                }
                Some(Some(dims)) if dims as usize != record.vector.len() => {
                    return Err(RecallError::DimensionMismatch {
                        expected: dims as usize,
                        actual: record.vector.len(),
                    })
                }
                Some(Some(_)) => {}
                Some(None) => {
                    tx.execute(
                        "UPDATE collections SET dimensions = ?1 WHERE name = ?2",
                        rusqlite::params![record.vector.len() as i64, collection],
                    )
                    .map_err(|e| RecallError::Storage(e.to_string()))?;
                }
            }

            tx.execute(
                "INSERT INTO records (collection, id, text, vector) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![collection, record.id, record.text, blob],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    RecallError::DuplicateId(record.id.clone())
                }
                other => RecallError::Storage(format!("Failed to insert record: {}", other)),
            })?;

            tx.commit()
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            debug!(collection, id = %record.id, "Record persisted");
            Ok(())
        })
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> Result<usize, RecallError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM records WHERE collection = ?1",
                    rusqlite::params![collection],
                    |row| row.get(0),
                )
                .map_err(|e| RecallError::Storage(e.to_string()))?;
            Ok(count as usize)
        })
    }

    /// Load every record of a collection in insertion order.
    pub fn load_all(&self, collection: &str) -> Result<Vec<VectorRecord>, RecallError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, text, vector FROM records
                     WHERE collection = ?1
                     ORDER BY seq ASC",
                )
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![collection], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })
                .map_err(|e| RecallError::Storage(e.to_string()))?;

            let mut records = Vec::new();
            for row in rows {
                let (id, text, blob) = row.map_err(|e| RecallError::Storage(e.to_string()))?;
                records.push(VectorRecord {
                    id,
                    text,
                    vector: decode_vector(&blob)?,
                });
            }
            Ok(records)
        })
    }
}

/// Encode a vector as little-endian f32 bytes.
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode little-endian f32 bytes produced by [`encode_vector`].
pub fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, RecallError> {
    if bytes.len() % 4 != 0 {
        return Err(RecallError::Storage(format!(
            "Corrupt vector blob: {} bytes is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_repo() -> CollectionRepository {
        CollectionRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let repo = make_repo();
        let first = repo.get_or_create("rag_experiment").unwrap();
        let second = repo.get_or_create("rag_experiment").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.dimensions, None);
        let listed = repo.list().unwrap();
        assert_eq!(listed, vec![first]);
    }

    #[test]
    fn test_insert_fixes_dimensions() {
        let repo = make_repo();
        repo.get_or_create("docs").unwrap();
        repo.insert("docs", &VectorRecord::new("0", "first", vec![1.0, 0.0, 0.0]))
            .unwrap();

        let info = repo.get_or_create("docs").unwrap();
        assert_eq!(info.dimensions, Some(3));
    }

    #[test]
    fn test_insert_rejects_dimension_mismatch() {
        let repo = make_repo();
        repo.get_or_create("docs").unwrap();
        repo.insert("docs", &VectorRecord::new("0", "first", vec![1.0, 0.0]))
            .unwrap();

        let err = repo
            .insert("docs", &VectorRecord::new("1", "second", vec![1.0, 0.0, 0.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            RecallError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(repo.count("docs").unwrap(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let repo = make_repo();
        repo.get_or_create("docs").unwrap();
        repo.insert("docs", &VectorRecord::new("0", "first", vec![1.0]))
            .unwrap();

        let err = repo
            .insert("docs", &VectorRecord::new("0", "again", vec![2.0]))
            .unwrap_err();
        assert!(matches!(err, RecallError::DuplicateId(ref id) if id == "0"));
        assert_eq!(repo.count("docs").unwrap(), 1);
    }

    #[test]
    fn test_same_id_in_different_collections() {
        let repo = make_repo();
        repo.get_or_create("a").unwrap();
        repo.get_or_create("b").unwrap();
        repo.insert("a", &VectorRecord::new("0", "in a", vec![1.0]))
            .unwrap();
        repo.insert("b", &VectorRecord::new("0", "in b", vec![1.0, 2.0]))
            .unwrap();

        assert_eq!(repo.count("a").unwrap(), 1);
        assert_eq!(repo.count("b").unwrap(), 1);

        let listed = repo.list().unwrap();
        let names: Vec<&str> = listed.iter().map(|info| info.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(listed[0].dimensions, Some(1));
        assert_eq!(listed[1].dimensions, Some(2));
    }

    #[test]
    fn test_insert_into_unknown_collection() {
        let repo = make_repo();
        let err = repo
            .insert("missing", &VectorRecord::new("0", "x", vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, RecallError::Storage(_)));
    }

    #[test]
    fn test_load_all_preserves_insertion_order() {
        let repo = make_repo();
        repo.get_or_create("docs").unwrap();
        for id in ["b", "a", "c"] {
            repo.insert("docs", &VectorRecord::new(id, format!("text {}", id), vec![0.5, -0.25]))
                .unwrap();
        }

        let records = repo.load_all("docs").unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(records[0].vector, vec![0.5, -0.25]);
        assert_eq!(records[2].text, "text c");
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recall.db");

        {
            let repo = CollectionRepository::new(Arc::new(Database::new(&path).unwrap()));
            repo.get_or_create("docs").unwrap();
            repo.insert("docs", &VectorRecord::new("0", "persisted", vec![0.1, 0.2]))
                .unwrap();
        }

        let repo = CollectionRepository::new(Arc::new(Database::new(&path).unwrap()));
        let info = repo.get_or_create("docs").unwrap();
        assert_eq!(info.dimensions, Some(2));
        assert_eq!(repo.count("docs").unwrap(), 1);
        assert_eq!(repo.load_all("docs").unwrap()[0].text, "persisted");
    }

    #[test]
    fn test_vector_blob_encoding() {
        let vector = vec![1.5f32, -0.0, f32::MIN_POSITIVE, 42.0];
        let blob = encode_vector(&vector);
        assert_eq!(blob.len(), 16);
        assert_eq!(decode_vector(&blob).unwrap(), vector);
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        assert!(matches!(
            decode_vector(&[0u8, 1, 2]),
            Err(RecallError::Storage(_))
        ));
    }
}
