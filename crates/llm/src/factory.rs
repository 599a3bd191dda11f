//! LLM provider factory.
//!
//! Creates LLM clients from the resolved provider name, endpoint, secret and
//! timeout. Clients are built once per process and shared behind `Arc`.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout for hosted model calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for openai)
/// * `organization` - OpenAI organization id (ignored by other providers)
/// * `timeout` - Optional request timeout (defaults to 60 seconds)
///
/// # Errors
/// Returns an error message if the provider is unknown, a required secret is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    organization: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_base_url(base_url)
                .with_timeout(timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::OpenAI) => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(crate::providers::openai::DEFAULT_OPENAI_BASE_URL);
            let mut client = OpenAiClient::with_base_url(api_key, base_url)
                .with_timeout(timeout)
                .map_err(|e| e.to_string())?;
            if let Some(organization) = organization {
                client = client.with_organization(organization);
            }
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}
