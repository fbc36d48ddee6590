//! Recall Vector crate - cosine similarity, the record store, top-k retrieval,
//! embedding/generation services, and the RAG pipeline.
//!
//! Provides an exact in-memory vector index with insertion-ordered records,
//! a SQLite-backed persistent collection, embedding and generation service
//! traits with offline implementations, text chunking, and prompt assembly.

pub mod chunker;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod persistent;
pub mod pipeline;
pub mod prompt;
pub mod similarity;
pub mod store;

pub use chunker::split_text;
pub use embedding::{DynEmbeddingService, EmbeddingService, HashEmbedding};
pub use generation::{ExtractiveGeneration, GenerationService};
pub use index::RetrievalIndex;
pub use persistent::PersistentCollection;
pub use pipeline::{IngestReport, RagAnswer, RagPipeline};
pub use prompt::build_prompt;
pub use similarity::cosine_similarity;
pub use store::{Collection, VectorStore};
