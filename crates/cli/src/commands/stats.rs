//! Stats command handler.

use clap::Args;
use crag_core::{config::AppConfig, AppResult};

/// Show document index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Collection name (defaults to retrieval.collection)
    #[arg(long)]
    pub collection: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let collection = self
            .collection
            .as_deref()
            .unwrap_or(&config.retrieval.collection);
        tracing::info!("Executing stats command for collection '{}'", collection);

        let stats = crag_knowledge::stats(&config.workspace, collection)?;

        if self.json {
            let output = serde_json::json!({
                "collection": stats.collection,
                "provider": stats.provider,
                "model": stats.model,
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
                "lastIngestedAt": stats.last_ingested_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Collection: {}", stats.collection);
            println!("  Embeddings: {} / {}", stats.provider, stats.model);
            println!("  Sources: {}", stats.sources_count);
            println!("  Chunks: {}", stats.chunks_count);
            println!("  DB size: {} bytes", stats.db_size_bytes);
            if let Some(last) = stats.last_ingested_at {
                println!("  Last ingest: {}", last);
            }
        }

        Ok(())
    }
}
