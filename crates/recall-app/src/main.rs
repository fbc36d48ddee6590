//! Recall binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open the persistent collection and embedding service
//! 4. Run the requested subcommand and print its result

mod cli;
mod commands;

use std::path::Path;

use clap::Parser;
use serde::Serialize;

use recall_core::config::RecallConfig;
use recall_core::types::RetrievedPassage;
use recall_vector::IngestReport;

use cli::{CliArgs, Command};

/// Load the config file if present, then apply CLI overrides.
fn resolve_config(args: &CliArgs) -> Result<RecallConfig, Box<dyn std::error::Error>> {
    let path = args.resolve_config_path();
    let mut config = if path.exists() {
        RecallConfig::load(&path)?
    } else {
        RecallConfig::default()
    };

    if let Some(ref dir) = args.data_dir {
        config.general.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(ref collection) = args.collection {
        config.storage.collection = collection.clone();
    }
    if let Some(ref level) = args.log_level {
        config.general.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_passages(passages: &[RetrievedPassage]) {
    if passages.is_empty() {
        println!("No matching passages.");
        return;
    }
    for passage in passages {
        println!("[{}] score {:.4} | {}", passage.id, passage.score, passage.text.trim());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config = resolve_config(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        database = %config.database_path().display(),
        collection = %config.storage.collection,
        "Configuration resolved"
    );

    match &args.command {
        Command::Ingest { file, force } => {
            let outcome = commands::ingest(&config, Path::new(file), *force).await?;
            if args.json {
                return print_json(&outcome);
            }
            match outcome.report {
                IngestReport::Stored { count } => {
                    println!("Stored {} of {} chunks from {}.", count, outcome.chunks, outcome.file)
                }
                IngestReport::Skipped { existing } => println!(
                    "Collection already holds {} records. Skipping ingestion (use --force to append).",
                    existing
                ),
            }
        }
        Command::Query { text, top_k } => {
            let passages = commands::query(&config, text, *top_k).await?;
            if args.json {
                return print_json(&passages);
            }
            print_passages(&passages);
        }
        Command::Ask { question, top_k } => {
            let answer = commands::ask(&config, question, *top_k).await?;
            if args.json {
                return print_json(&answer);
            }
            println!("{}\n", answer.answer);
            println!("Sources:");
            print_passages(&answer.sources);
        }
        Command::Stats => {
            let stats = commands::stats(&config)?;
            if args.json {
                return print_json(&stats);
            }
            let dimensions = stats
                .collection
                .dimensions
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unset".to_string());
            println!(
                "Collection '{}': {} records, {} dimensions",
                stats.collection.name, stats.collection.count, dimensions
            );
            if stats.stored.len() > 1 {
                println!("Stored collections:");
                for other in &stats.stored {
                    println!("  {} ({} records)", other.name, other.count);
                }
            }
        }
        Command::Init { force } => {
            let path = args.resolve_config_path();
            commands::init(&config, &path, *force)?;
            if args.json {
                return print_json(&serde_json::json!({ "config": path }));
            }
            println!("Configuration written to {}.", path.display());
        }
    }

    Ok(())
}
