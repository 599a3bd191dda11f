//! Web search fallback.

use async_trait::async_trait;
use crag_core::config::WebSearchConfig;
use crag_core::{AppError, AppResult};
use crag_knowledge::Document;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Live web search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>>;
}

/// Fold search hits into the single synthetic document the workflow appends.
///
/// Contents are joined with newlines; the document carries no metadata.
pub fn results_to_document(results: &[SearchResult]) -> Document {
    Document::new(
        results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Tavily search API client.
pub struct TavilySearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

impl TavilySearch {
    /// A missing key is reported when a search is attempted, so runs that
    /// never fall back to web search work without one.
    pub fn new(api_key: Option<String>, max_results: usize) -> AppResult<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            endpoint: DEFAULT_TAVILY_ENDPOINT.to_string(),
            api_key,
            max_results,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }
}

fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Search(format!("Failed to create HTTP client: {}", e)))
}

#[async_trait]
impl WebSearch for TavilySearch {
    #[instrument(skip(self), fields(max_results = self.max_results))]
    async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Search("Tavily API key not set (TAVILY_API_KEY)".to_string())
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&TavilyRequest {
                query,
                max_results: self.max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to call Tavily: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Tavily API error ({}): {}",
                status, body
            )));
        }

        let mut body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse Tavily response: {}", e)))?;
        body.results.truncate(self.max_results);

        tracing::debug!("Tavily returned {} results", body.results.len());
        Ok(body.results)
    }
}

/// Create the configured web search client.
pub fn create_search_client(
    config: &WebSearchConfig,
    api_key: Option<String>,
) -> AppResult<Arc<dyn WebSearch>> {
    match config.provider.to_lowercase().as_str() {
        "tavily" => {
            let mut search = TavilySearch::new(api_key, config.max_results)?;
            if let Some(endpoint) = &config.endpoint {
                search = search.with_endpoint(endpoint.clone());
            }
            if let Some(timeout) = config.timeout {
                search = search.with_timeout(Duration::from_secs(timeout))?;
            }
            Ok(Arc::new(search))
        }
        other => Err(AppError::Config(format!(
            "Unknown web search provider: {}. Supported: tavily",
            other
        ))),
    }
}
