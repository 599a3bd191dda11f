//! Document store accessor.

use crate::document::Document;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::{config, index};
use async_trait::async_trait;
use crag_core::{AppError, AppResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Returns the candidate documents for a query, most similar first.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<Document>>;
}

/// Retriever over a collection's SQLite vector index.
///
/// The embedding provider is fixed when the retriever is opened; the index
/// itself is opened per query so a concurrent `ingest` is picked up.
#[derive(Debug)]
pub struct VectorStoreRetriever {
    index_path: PathBuf,
    collection: String,
    top_k: usize,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorStoreRetriever {
    /// Open `collection` in `workspace`, embedding queries with the
    /// collection's configured provider.
    pub fn open(
        workspace: &Path,
        collection: &str,
        top_k: usize,
        api_key: Option<&str>,
        timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let collection_config = config::load_config(workspace, collection)?;
        let embedder = create_provider(&collection_config, api_key, timeout)?;

        Ok(Self::with_embedder(workspace, collection, top_k, embedder))
    }

    /// Build a retriever around an existing embedding provider.
    pub fn with_embedder(
        workspace: &Path,
        collection: &str,
        top_k: usize,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            index_path: config::get_index_path(workspace, collection),
            collection: collection.to_string(),
            top_k,
            embedder,
        }
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<Document>> {
        if !self.index_path.exists() {
            return Err(AppError::Knowledge(format!(
                "Collection '{}' has no index. Run 'crag ingest' first.",
                self.collection
            )));
        }

        let query_embedding = self.embedder.embed(query).await?;

        let conn = index::init_index(&self.index_path)?;
        let results = index::query_chunks(&conn, &query_embedding, self.top_k)?;

        if let Some((_, top)) = results.first() {
            tracing::debug!(
                "Retrieved {} chunks from '{}' (top score: {:.3})",
                results.len(),
                self.collection,
                top
            );
        }

        Ok(results
            .into_iter()
            .map(|(chunk, _score)| Document {
                page_content: chunk.text,
                metadata: match chunk.metadata {
                    Value::Object(map) => map,
                    _ => Default::default(),
                },
            })
            .collect())
    }
}
