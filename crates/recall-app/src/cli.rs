//! CLI argument definitions for the `recall` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Recall - embed a text corpus and answer questions from its closest passages.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the collection database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Collection to operate on.
    #[arg(long = "collection", global = true)]
    pub collection: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Chunk a text file, embed every chunk, and store it in the collection.
    Ingest {
        /// UTF-8 text file to ingest.
        file: PathBuf,
        /// Append even if the collection already holds records.
        #[arg(long)]
        force: bool,
    },
    /// Show the passages most similar to a query.
    Query {
        text: String,
        /// Number of passages to return (defaults to retrieval.top_k).
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
    },
    /// Answer a question from the closest passages.
    Ask {
        question: String,
        /// Number of passages used as context (defaults to retrieval.top_k).
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
    },
    /// Show collection size and dimensionality.
    Stats,
    /// Write the resolved configuration to the config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RECALL_CONFIG env var > ~/.recall/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RECALL_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".recall").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".recall").join("config.toml");
    }
    PathBuf::from("config.toml")
}
