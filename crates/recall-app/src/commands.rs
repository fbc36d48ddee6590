//! Subcommand implementations.
//!
//! Each command opens the configured persistent collection, builds the
//! pipeline from configuration, and returns a serialisable result for
//! `main` to print.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use recall_core::config::RecallConfig;
use recall_core::error::{RecallError, Result};
use recall_core::types::{CollectionStats, RetrievedPassage};
use recall_storage::Database;
use recall_vector::embedding::{self, DynEmbeddingService};
use recall_vector::{
    split_text, ExtractiveGeneration, IngestReport, PersistentCollection, RagAnswer, RagPipeline,
};

type Pipeline = RagPipeline<Box<dyn DynEmbeddingService>, PersistentCollection>;

/// Open the configured collection and wire it to the configured embedder.
pub fn open_pipeline(config: &RecallConfig) -> Result<Pipeline> {
    let db = Arc::new(Database::new(&config.database_path())?);
    let store = PersistentCollection::open(db, &config.storage.collection)?;
    let embedder = embedding::from_config(&config.embedding)?;
    Ok(RagPipeline::new(store, embedder).with_min_score(config.retrieval.min_score))
}

#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    pub file: String,
    pub chunks: usize,
    pub report: IngestReport,
}

pub async fn ingest(config: &RecallConfig, file: &Path, force: bool) -> Result<IngestOutcome> {
    let text = std::fs::read_to_string(file).map_err(|e| {
        RecallError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", file.display(), e),
        ))
    })?;

    let chunks: Vec<String> = split_text(
        &text,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    )?
    .into_iter()
    .filter(|chunk| !chunk.trim().is_empty())
    .collect();
    info!(file = %file.display(), chunks = chunks.len(), "File chunked");

    let mut pipeline = open_pipeline(config)?;
    let report = if force {
        pipeline.append_documents(&chunks).await?
    } else {
        pipeline.ingest_documents(&chunks).await?
    };

    Ok(IngestOutcome {
        file: file.display().to_string(),
        chunks: chunks.len(),
        report,
    })
}

pub async fn query(config: &RecallConfig, text: &str, top_k: Option<usize>) -> Result<Vec<RetrievedPassage>> {
    let pipeline = open_pipeline(config)?;
    let k = top_k.unwrap_or(config.retrieval.top_k);
    let hits = pipeline.retrieve(text, k).await?;
    Ok(hits.iter().map(|hit| hit.to_passage()).collect())
}

pub async fn ask(config: &RecallConfig, question: &str, top_k: Option<usize>) -> Result<RagAnswer> {
    let pipeline = open_pipeline(config)?;
    let k = top_k.unwrap_or(config.retrieval.top_k);
    pipeline.answer(question, k, &ExtractiveGeneration::new()).await
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub collection: CollectionStats,
    /// Every collection in the database, including the current one.
    pub stored: Vec<CollectionStats>,
}

pub fn stats(config: &RecallConfig) -> Result<StatsReport> {
    let pipeline = open_pipeline(config)?;
    Ok(StatsReport {
        collection: pipeline.collection().stats(),
        stored: pipeline.store().catalog()?,
    })
}

/// Write `config` to `path`, refusing to replace an existing file unless
/// `force` is set.
pub fn init(config: &RecallConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(RecallError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config.save(path)
}
