//! Ingest and clean command handlers.

use clap::Args;
use crag_core::{config::AppConfig, AppResult};
use crag_knowledge::IngestOptions;
use std::path::PathBuf;

/// Build the document index from files and URLs
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to index
    #[arg(long)]
    pub path: Vec<PathBuf>,

    /// URLs to fetch and index (defaults to the built-in pages when no source is given)
    #[arg(long)]
    pub url: Vec<String>,

    /// Drop the existing index before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Collection name (defaults to retrieval.collection)
    #[arg(long)]
    pub collection: Option<String>,

    /// Embedding provider for a new or reset collection (openai, ollama, trigram)
    #[arg(long)]
    pub embedding_provider: Option<String>,

    /// Embedding model for a new or reset collection
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let collection = self
            .collection
            .clone()
            .unwrap_or_else(|| config.retrieval.collection.clone());
        tracing::info!("Executing ingest command for collection '{}'", collection);

        let options = IngestOptions {
            collection: collection.clone(),
            paths: self.path.clone(),
            urls: self.url.clone(),
            reset: self.reset,
            embedding_provider: self.embedding_provider.clone(),
            embedding_model: self.embedding_model.clone(),
        };

        let api_key = config.resolve_api_key("openai");
        let stats = crag_knowledge::ingest(&config.workspace, options, api_key.as_deref()).await?;

        if self.json {
            let output = serde_json::json!({
                "collection": collection,
                "skipped": stats.skipped,
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "failedSources": stats.failed_sources,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if stats.skipped {
            println!(
                "Collection '{}' is already indexed; use --reset to rebuild it",
                collection
            );
        } else {
            println!(
                "Indexed {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
            for failed in &stats.failed_sources {
                println!("  failed: {}", failed);
            }
        }

        Ok(())
    }
}

/// Empty the document index
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Collection name (defaults to retrieval.collection)
    #[arg(long)]
    pub collection: Option<String>,
}

impl CleanCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let collection = self
            .collection
            .as_deref()
            .unwrap_or(&config.retrieval.collection);
        tracing::info!("Executing clean command for collection '{}'", collection);

        crag_knowledge::clean(&config.workspace, collection)?;
        println!("Collection '{}' cleaned", collection);

        Ok(())
    }
}
