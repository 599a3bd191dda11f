//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a vector store collection.
///
/// Persisted as `config.yaml` next to the collection's SQLite index so that
/// queries always embed with the same model the index was built with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionConfig {
    /// Name of the collection
    pub name: String,

    /// Embedding provider: "openai", "ollama" or "trigram"
    pub provider: String,

    /// Embedding model
    pub model: String,

    /// Embedding vector dimension
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Provider endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Overlap between chunks
    #[serde(default)]
    pub chunk_overlap: u32,

    /// Maximum number of texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_dimensions() -> usize {
    1536
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_batch_size() -> usize {
    100
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: default_dimensions(),
            endpoint: None,
            chunk_size: default_chunk_size(),
            chunk_overlap: 0,
            batch_size: default_batch_size(),
        }
    }
}

/// A source document recorded in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Unique source identifier
    pub id: String,

    /// File path or URL
    pub location: String,

    /// Source type: "file" or "url"
    pub source_type: String,

    /// Detected content type
    pub content_type: String,

    /// When this source was ingested
    pub ingested_at: DateTime<Utc>,

    /// Extracted text size in bytes
    pub size_bytes: u64,
}

/// A text chunk with embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Metadata (always carries `source`)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Options for the ingest operation.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Collection name
    pub collection: String,

    /// Local files or directories
    pub paths: Vec<PathBuf>,

    /// URLs to fetch
    pub urls: Vec<String>,

    /// Drop existing data before ingesting
    pub reset: bool,

    /// Embedding provider for a new collection
    pub embedding_provider: Option<String>,

    /// Embedding model for a new collection
    pub embedding_model: Option<String>,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of sources processed
    pub sources_count: u32,

    /// Number of chunks created
    pub chunks_count: u32,

    /// Total bytes of extracted text
    pub bytes_processed: u64,

    /// Sources that failed to load
    pub failed_sources: Vec<String>,

    /// True when an existing index was left untouched
    pub skipped: bool,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Collection name
    pub collection: String,

    /// Embedding provider
    pub provider: String,

    /// Embedding model
    pub model: String,

    /// Number of sources
    pub sources_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,

    /// Most recent ingestion
    pub last_ingested_at: Option<DateTime<Utc>>,
}

/// Internal chunk candidate before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub source_id: String,
    pub position: u32,
    pub text: String,
    pub metadata: serde_json::Value,
}
