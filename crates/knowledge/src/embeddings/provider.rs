//! Embedding provider trait and factory.

use super::providers::{OllamaProvider, OpenAiProvider, TrigramProvider};
use crate::types::CollectionConfig;
use crag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on collection configuration.
pub fn create_provider(
    config: &CollectionConfig,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Knowledge(
                    "OpenAI embeddings require an API key (set OPENAI_API_KEY)".to_string(),
                )
            })?;

            let mut provider = OpenAiProvider::new(api_key, &config.model, config.dimensions)?;
            if let Some(endpoint) = &config.endpoint {
                provider = provider.with_base_url(endpoint);
            }
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(timeout)?;
            }
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let mut provider = OllamaProvider::new(&config.model, config.dimensions)?;
            if let Some(endpoint) = &config.endpoint {
                provider = provider.with_base_url(endpoint);
            }
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(timeout)?;
            }
            Ok(Arc::new(provider))
        }

        "trigram" => Ok(Arc::new(TrigramProvider::new(config.dimensions))),

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, trigram",
            config.provider
        ))),
    }
}
