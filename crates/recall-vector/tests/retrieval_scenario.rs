//! End-to-end retrieval tests over the five-document knowledge base.
//!
//! Vectors are synthetic and laid out on four axes (space, France, tech,
//! food) so every cosine score can be computed by hand.

use std::collections::HashMap;
use std::sync::Arc;

use recall_core::error::RecallError;
use recall_storage::Database;
use recall_vector::{
    Collection, EmbeddingService, ExtractiveGeneration, IngestReport, PersistentCollection,
    RagPipeline, RetrievalIndex,
};

// =============================================================================
// Helpers
// =============================================================================

const QUERY: &str = "Tell me about food in France";

fn knowledge_base() -> Vec<(&'static str, Vec<f32>)> {
    vec![
        ("Mars is the fourth planet from the Sun.", vec![1.0, 0.0, 0.0, 0.0]),
        ("The capital of France is Paris.", vec![0.0, 1.0, 0.0, 0.0]),
        ("Python is a great language for AI.", vec![0.0, 0.0, 1.0, 0.0]),
        ("Elon Musk wants to colonize Mars.", vec![1.0, 0.0, 0.5, 0.0]),
        ("Croissants are a popular French pastry.", vec![0.0, 1.0, 0.0, 2.0]),
    ]
}

fn query_vector() -> Vec<f32> {
    vec![0.0, 1.0, 0.0, 1.0]
}

/// Embedder with a fixed lookup table, standing in for a hosted model.
struct TableEmbedding {
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedding {
    fn new() -> Self {
        let mut table: HashMap<String, Vec<f32>> = knowledge_base()
            .into_iter()
            .map(|(text, vector)| (text.to_string(), vector))
            .collect();
        table.insert(QUERY.to_string(), query_vector());
        Self { table }
    }
}

impl EmbeddingService for TableEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| RecallError::Provider(format!("no embedding for {:?}", text)))
    }

    fn dimensions(&self) -> usize {
        4
    }
}

fn populated_collection() -> Collection {
    let mut collection = Collection::new("rag_experiment");
    for (i, (text, vector)) in knowledge_base().into_iter().enumerate() {
        collection.add(i.to_string(), text, vector).unwrap();
    }
    collection
}

// =============================================================================
// Index scenario
// =============================================================================

#[test]
fn food_in_france_returns_pastry_then_paris() {
    let collection = populated_collection();
    let hits = RetrievalIndex::new(&collection).search(&query_vector(), 2).unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "4");
    assert_eq!(hits[0].text, "Croissants are a popular French pastry.");
    assert_eq!(hits[1].id, "1");
    assert_eq!(hits[1].text, "The capital of France is Paris.");

    // cos(q, v4) = 3 / (sqrt(2) * sqrt(5)), cos(q, v1) = 1 / sqrt(2)
    assert!((hits[0].score - 3.0 / 10f64.sqrt()).abs() < 1e-9);
    assert!((hits[1].score - 1.0 / 2f64.sqrt()).abs() < 1e-9);
}

#[test]
fn full_ranking_puts_ties_in_insertion_order() {
    let collection = populated_collection();
    let hits = RetrievalIndex::new(&collection).search(&query_vector(), 10).unwrap();

    // Mars, Python and Musk all score exactly zero against the query.
    let ids: Vec<&str> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec!["4", "1", "0", "2", "3"]);
    assert!(hits[2..].iter().all(|h| h.score == 0.0));
}

#[test]
fn every_record_keeps_collection_dimensionality() {
    let mut collection = populated_collection();
    assert!(collection.all().all(|r| r.vector.len() == 4));

    let err = collection
        .add("5", "A record with the wrong shape.", vec![1.0, 0.0, 0.0])
        .unwrap_err();
    assert!(matches!(err, RecallError::DimensionMismatch { .. }));
    assert_eq!(collection.count(), 5);
}

// =============================================================================
// Pipeline scenario
// =============================================================================

#[tokio::test]
async fn pipeline_answers_from_top_passages() {
    let documents: Vec<&str> = knowledge_base().into_iter().map(|(t, _)| t).collect();
    let mut pipeline = RagPipeline::new(Collection::new("rag_experiment"), TableEmbedding::new());

    let report = pipeline.ingest_documents(&documents).await.unwrap();
    assert_eq!(report, IngestReport::Stored { count: 5 });

    let answer = pipeline
        .answer(QUERY, 2, &ExtractiveGeneration::new())
        .await
        .unwrap();
    assert_eq!(answer.answer, "Croissants are a popular French pastry.");
    let source_ids: Vec<&str> = answer.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(source_ids, vec!["4", "1"]);
}

#[tokio::test]
async fn pipeline_surfaces_provider_failure_unchanged() {
    let pipeline = RagPipeline::new(populated_collection(), TableEmbedding::new());
    let err = pipeline.retrieve("unknown question", 2).await.unwrap_err();
    match err {
        RecallError::Provider(message) => assert!(message.contains("unknown question")),
        other => panic!("expected provider failure, got {:?}", other),
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn reingestion_against_persisted_collection_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recall.db");
    let documents: Vec<&str> = knowledge_base().into_iter().map(|(t, _)| t).collect();

    {
        let db = Arc::new(Database::new(&path).unwrap());
        let store = PersistentCollection::open(db, "rag_experiment").unwrap();
        let mut pipeline = RagPipeline::new(store, TableEmbedding::new());
        let report = pipeline.ingest_documents(&documents).await.unwrap();
        assert_eq!(report, IngestReport::Stored { count: 5 });
    }

    let db = Arc::new(Database::new(&path).unwrap());
    let store = PersistentCollection::open(db, "rag_experiment").unwrap();
    assert_eq!(store.count(), 5);

    let mut pipeline = RagPipeline::new(store, TableEmbedding::new());
    let report = pipeline.ingest_documents(&documents).await.unwrap();
    assert_eq!(report, IngestReport::Skipped { existing: 5 });

    let hits = pipeline.retrieve(QUERY, 2).await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec!["4", "1"]);
}
