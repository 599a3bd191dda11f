//! Vector store for C-RAG.
//!
//! Local-first document store using SQLite and embeddings: offline ingestion
//! of files and web pages, and top-k similarity retrieval for the workflow.

pub mod chunker;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod retriever;
pub mod types;


pub use document::Document;
pub use retriever::{Retriever, VectorStoreRetriever};
pub use types::{
    CollectionConfig, CollectionStats, IngestOptions, IngestStats, KnowledgeChunk,
    KnowledgeSource,
};

use chrono::Utc;
use crag_core::{AppError, AppResult};
use embeddings::EmbeddingProvider;
use parser::ContentType;
use std::path::Path;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Pages indexed when neither paths nor URLs are given.
pub const DEFAULT_URLS: [&str; 3] = [
    "https://lilianweng.github.io/posts/2023-06-23-agent/",
    "https://lilianweng.github.io/posts/2023-03-15-prompt-engineering/",
    "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/",
];

const FETCH_TIMEOUT_SECS: u64 = 30;

/// A loaded source awaiting chunking.
struct LoadedSource {
    location: String,
    source_type: &'static str,
    content_type: ContentType,
    text: String,
}

/// Build (or extend) a collection's index from files and URLs.
///
/// An index that already holds chunks is left untouched unless
/// `options.reset` is set.
pub async fn ingest(
    workspace: &Path,
    options: IngestOptions,
    api_key: Option<&str>,
) -> AppResult<IngestStats> {
    let start = Instant::now();
    let index_path = config::get_index_path(workspace, &options.collection);

    if index_path.exists() && !options.reset {
        let conn = index::init_index(&index_path)?;
        let (sources_count, chunks_count) = index::get_stats(&conn)?;
        if chunks_count > 0 {
            tracing::info!(
                "Collection '{}' already indexed ({} sources, {} chunks), skipping",
                options.collection,
                sources_count,
                chunks_count
            );
            return Ok(IngestStats {
                sources_count: 0,
                chunks_count: 0,
                bytes_processed: 0,
                failed_sources: Vec::new(),
                skipped: true,
                duration_secs: start.elapsed().as_secs_f64(),
            });
        }
    }

    tracing::info!("Starting ingestion for collection '{}'", options.collection);

    let mut collection_config = config::load_config(workspace, &options.collection)?;
    apply_embedding_overrides(&mut collection_config, &options);
    let embedder = embeddings::create_provider(&collection_config, api_key, None)?;

    let mut stats = IngestStats {
        sources_count: 0,
        chunks_count: 0,
        bytes_processed: 0,
        failed_sources: Vec::new(),
        skipped: false,
        duration_secs: 0.0,
    };

    let mut locations: Vec<SourceLocation> = Vec::new();
    for path in &options.paths {
        collect_paths(path, &mut locations);
    }
    locations.extend(options.urls.iter().cloned().map(SourceLocation::Url));

    if locations.is_empty() {
        tracing::info!("No sources given, ingesting the default pages");
        locations.extend(
            DEFAULT_URLS
                .iter()
                .map(|url| SourceLocation::Url(url.to_string())),
        );
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(concat!("crag/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Knowledge(format!("Failed to create HTTP client: {}", e)))?;

    let mut ready: Vec<PreparedSource> = Vec::new();
    for location in locations {
        let loaded = match &location {
            SourceLocation::File(path) => load_file(path),
            SourceLocation::Url(url) => fetch_url(&http, url).await,
        };

        let source = match loaded {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping source {}: {}", location, e);
                stats.failed_sources.push(location.to_string());
                continue;
            }
        };

        let prepared = embed_source(embedder.as_ref(), &collection_config, source).await?;
        stats.sources_count += 1;
        stats.chunks_count += prepared.chunks.len() as u32;
        stats.bytes_processed += prepared.source.size_bytes;
        ready.push(prepared);
    }

    if stats.sources_count == 0 && !stats.failed_sources.is_empty() {
        return Err(AppError::Knowledge(format!(
            "No sources could be ingested ({} failed)",
            stats.failed_sources.len()
        )));
    }

    // Reset and inserts land together or not at all
    let mut conn = index::init_index(&index_path)?;
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;
    if options.reset {
        tracing::info!("Resetting collection '{}'", options.collection);
        index::reset_index(&tx)?;
    }
    for prepared in &ready {
        index::insert_source(&tx, &prepared.source)?;
        for chunk in &prepared.chunks {
            index::insert_chunk(&tx, chunk)?;
        }
    }
    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit index: {}", e)))?;

    config::save_config(workspace, &collection_config)?;

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Ingestion completed: {} sources, {} chunks, {} bytes in {:.2}s",
        stats.sources_count,
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

enum SourceLocation {
    File(std::path::PathBuf),
    Url(String),
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::File(path) => write!(f, "{}", path.display()),
            SourceLocation::Url(url) => write!(f, "{}", url),
        }
    }
}

fn collect_paths(path: &Path, out: &mut Vec<SourceLocation>) {
    if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            if entry.file_type().is_file() && !is_hidden(relative) {
                out.push(SourceLocation::File(entry.path().to_path_buf()));
            }
        }
    } else {
        out.push(SourceLocation::File(path.to_path_buf()));
    }
}

fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s.starts_with('.') && s != "." && s != "..")
            .unwrap_or(false)
    })
}

fn load_file(path: &Path) -> AppResult<LoadedSource> {
    Ok(LoadedSource {
        location: path.to_string_lossy().to_string(),
        source_type: "file",
        content_type: ContentType::from_path(path),
        text: parser::parse_file(path)?,
    })
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> AppResult<LoadedSource> {
    tracing::debug!("Fetching {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Knowledge(format!("Failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Knowledge(format!(
            "Failed to fetch {}: HTTP {}",
            url, status
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ContentType::from_mime)
        .unwrap_or(ContentType::Html);

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Knowledge(format!("Failed to read {}: {}", url, e)))?;

    let text = parser::extract_text(&body, content_type)
        .ok_or_else(|| AppError::Knowledge(format!("Unsupported content at {}", url)))?;

    Ok(LoadedSource {
        location: url.to_string(),
        source_type: "url",
        content_type,
        text,
    })
}

/// A source with its embedded chunks, not yet written to the index.
struct PreparedSource {
    source: KnowledgeSource,
    chunks: Vec<KnowledgeChunk>,
}

/// Chunk a source and embed the chunks in batches.
async fn embed_source(
    embedder: &dyn EmbeddingProvider,
    collection_config: &CollectionConfig,
    source: LoadedSource,
) -> AppResult<PreparedSource> {
    let size_bytes = source.text.len() as u64;
    let source_id = uuid::Uuid::new_v4().to_string();

    let candidates = chunker::chunk_text(
        &source_id,
        &source.location,
        &source.text,
        collection_config.chunk_size as usize,
        collection_config.chunk_overlap as usize,
    );

    let mut chunks = Vec::with_capacity(candidates.len());
    for batch in candidates.chunks(collection_config.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        for (candidate, embedding) in batch.iter().zip(embeddings) {
            chunks.push(KnowledgeChunk {
                id: uuid::Uuid::new_v4().to_string(),
                source_id: candidate.source_id.clone(),
                position: candidate.position,
                text: candidate.text.clone(),
                embedding: Some(embedding),
                metadata: candidate.metadata.clone(),
            });
        }
    }

    tracing::debug!(
        "Embedded {}: {} chunks, {} bytes",
        source.location,
        chunks.len(),
        size_bytes
    );

    Ok(PreparedSource {
        source: KnowledgeSource {
            id: source_id,
            location: source.location,
            source_type: source.source_type.to_string(),
            content_type: source.content_type.as_str().to_string(),
            ingested_at: Utc::now(),
            size_bytes,
        },
        chunks,
    })
}

/// Apply embedding provider/model overrides to a collection config.
fn apply_embedding_overrides(config: &mut CollectionConfig, options: &IngestOptions) {
    if let Some(provider) = &options.embedding_provider {
        if provider != &config.provider {
            let (model, dimensions) = match provider.as_str() {
                "ollama" => ("nomic-embed-text", 768),
                "trigram" => ("trigram-v1", 384),
                _ => ("text-embedding-3-small", 1536),
            };
            config.provider = provider.clone();
            config.model = model.to_string();
            config.dimensions = dimensions;
        }
    }

    if let Some(model) = &options.embedding_model {
        config.model = model.clone();
    }
}

/// Statistics for a collection.
pub fn stats(workspace: &Path, collection: &str) -> AppResult<CollectionStats> {
    let index_path = config::get_index_path(workspace, collection);
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Collection '{}' does not exist",
            collection
        )));
    }

    let collection_config = config::load_config(workspace, collection)?;
    let conn = index::init_index(&index_path)?;
    let (sources_count, chunks_count) = index::get_stats(&conn)?;
    let db_size_bytes = std::fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0);

    Ok(CollectionStats {
        collection: collection.to_string(),
        provider: collection_config.provider,
        model: collection_config.model,
        sources_count,
        chunks_count,
        db_size_bytes,
        last_ingested_at: index::last_ingested_at(&conn)?,
    })
}

/// Empty a collection's index.
pub fn clean(workspace: &Path, collection: &str) -> AppResult<()> {
    let index_path = config::get_index_path(workspace, collection);
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Collection '{}' does not exist",
            collection
        )));
    }

    let conn = index::init_index(&index_path)?;
    index::reset_index(&conn)?;

    tracing::info!("Collection '{}' cleaned", collection);
    Ok(())
}
