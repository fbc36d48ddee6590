use thiserror::Error;

/// Top-level error type for the Recall workspace.
///
/// Retrieval-contract violations (`DimensionMismatch`, `DuplicateId`,
/// `InvalidArgument`) are returned synchronously to the direct caller.
/// `Provider` carries failures from embedding/generation collaborators
/// unchanged; nothing in the core retries them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecallError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate record id: {0}")]
    DuplicateId(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Provider failure: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RecallError {
    fn from(err: toml::de::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RecallError {
    fn from(err: toml::ser::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(err: serde_json::Error) -> Self {
        RecallError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Recall operations.
pub type Result<T> = std::result::Result<T, RecallError>;
