//! Recall RAG pipeline.
//!
//! `RagPipeline` ties an embedding service to a vector store:
//! 1. Ingestion: embed each passage and append it to the store
//! 2. Retrieval: embed the query and rank the store by cosine similarity
//! 3. Answering: build a grounded prompt and hand it to a generation service

use serde::Serialize;
use tracing::{debug, info};

use recall_core::error::RecallError;
use recall_core::types::{RetrievedPassage, ScoredResult, VectorRecord};

use crate::embedding::{validate_embedding, EmbeddingService};
use crate::generation::GenerationService;
use crate::index::RetrievalIndex;
use crate::prompt::build_prompt;
use crate::store::{Collection, VectorStore};

/// Outcome of a bulk ingestion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IngestReport {
    /// Documents were embedded and stored.
    Stored { count: usize },
    /// The store already held records, so nothing was ingested.
    Skipped { existing: usize },
}

/// A generated answer together with the passages it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<RetrievedPassage>,
    pub prompt: String,
}

/// Embedding service plus vector store.
pub struct RagPipeline<E: EmbeddingService, S: VectorStore = Collection> {
    store: S,
    embedder: E,
    min_score: Option<f64>,
}

impl<E: EmbeddingService, S: VectorStore> RagPipeline<E, S> {
    pub fn new(store: S, embedder: E) -> Self {
        Self {
            store,
            embedder,
            min_score: None,
        }
    }

    /// Drop retrieved passages scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Embed one passage and append it under `id`.
    pub async fn ingest(&mut self, id: &str, text: &str) -> Result<(), RecallError> {
        let vector = self.embed(text).await?;
        self.store
            .add_record(VectorRecord::new(id, text, vector))?;
        debug!(id, "Passage ingested");
        Ok(())
    }

    /// Ingest documents with sequential ids `"0"`, `"1"`, ... unless the
    /// store already holds records, in which case nothing happens.
    ///
    /// Re-running ingestion against a populated store is therefore a skip,
    /// never an error.
    pub async fn ingest_documents<I, T>(&mut self, documents: I) -> Result<IngestReport, RecallError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        if !self.store.is_empty() {
            let existing = self.store.count();
            info!(existing, "Store already populated, skipping ingestion");
            return Ok(IngestReport::Skipped { existing });
        }
        self.append_documents(documents).await
    }

    /// Ingest documents after any existing records, using the next free
    /// numeric ids.
    pub async fn append_documents<I, T>(&mut self, documents: I) -> Result<IngestReport, RecallError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut next_id = self.store.count();
        let mut count = 0;
        for document in documents {
            while self.store.collection().contains(&next_id.to_string()) {
                next_id += 1;
            }
            self.ingest(&next_id.to_string(), document.as_ref()).await?;
            next_id += 1;
            count += 1;
        }
        info!(count, total = self.store.count(), "Documents ingested");
        Ok(IngestReport::Stored { count })
    }

    /// Embed `query` and return the `k` most similar stored passages.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredResult<'_>>, RecallError> {
        if k == 0 {
            return Err(RecallError::InvalidArgument(
                "k must be greater than zero".to_string(),
            ));
        }
        let query_vec = self.embed(query).await?;
        let index = RetrievalIndex::new(self.store.collection());
        match self.min_score {
            Some(min) => index.search_with_threshold(&query_vec, k, min),
            None => index.search(&query_vec, k),
        }
    }

    /// Retrieve context for `question` and ask `generator` to answer it.
    pub async fn answer<G: GenerationService>(
        &self,
        question: &str,
        k: usize,
        generator: &G,
    ) -> Result<RagAnswer, RecallError> {
        let hits = self.retrieve(question, k).await?;
        let prompt = build_prompt(&hits, question);
        let answer = generator.complete_grounded(&prompt, &hits).await?;

        info!(sources = hits.len(), "Answer generated");
        Ok(RagAnswer {
            answer,
            sources: hits.iter().map(ScoredResult::to_passage).collect(),
            prompt,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &Collection {
        self.store.collection()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        let vector = self.embedder.embed(text).await?;
        validate_embedding(vector, self.embedder.dimensions())
    }
}
