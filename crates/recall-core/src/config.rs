use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecallError, Result};

/// Top-level configuration for Recall.
///
/// Loaded from `~/.recall/config.toml` by default and passed explicitly to
/// every constructor that needs it. Nothing reads configuration from
/// process-wide state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl RecallConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecallConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimensions == 0 {
            return Err(RecallError::Config(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(RecallError::Config(
                "retrieval.top_k must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_size == 0 {
            return Err(RecallError::Config(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(RecallError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.storage.collection.trim().is_empty() {
            return Err(RecallError::Config(
                "storage.collection must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full path of the SQLite file backing persisted collections.
    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.general.data_dir).join(&self.storage.database_file)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the collection database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "./recall_data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name. Only "hash" ships with Recall.
    pub provider: String,
    /// Vector dimensionality produced by the provider.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            dimensions: 768,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages returned when the caller does not ask for a count.
    pub top_k: usize,
    /// Passages scoring below this are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            min_score: None,
        }
    }
}

/// Fixed-window text chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Persisted collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file name, relative to `general.data_dir`.
    pub database_file: String,
    /// Name of the collection opened by the CLI.
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "recall.db".to_string(),
            collection: "rag_experiment".to_string(),
        }
    }
}
