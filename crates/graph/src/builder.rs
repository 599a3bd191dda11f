//! Wiring the workflow from configuration.

use crate::chains::Chains;
use crate::graph::{CragGraph, GraphSettings};
use crate::search::create_search_client;
use crag_core::{AppConfig, AppError, AppResult};
use crag_knowledge::VectorStoreRetriever;
use crag_llm::create_client;
use std::sync::Arc;
use std::time::Duration;

impl CragGraph {
    /// Build every collaborator once from `config`.
    ///
    /// One LLM client serves the generator and the graders; they differ only
    /// in model. Query embeddings use the collection's own provider.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider = config.provider.as_str();
        let timeout = config.provider_timeout(provider).map(Duration::from_secs);
        let api_key = config.resolve_api_key(provider);
        let endpoint = config.provider_endpoint(provider);
        let organization = config.resolve_organization(provider);

        tracing::debug!(
            "Building workflow: provider={}, model={}, grader_model={}",
            provider,
            config.model,
            config.grader_model
        );

        let client = create_client(
            provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            organization.as_deref(),
            timeout,
        )
        .map_err(AppError::Llm)?;

        let chains = Chains::load(
            &config.workspace,
            client,
            &config.model,
            &config.grader_model,
        )?;

        let embedding_key = config.resolve_api_key("openai");
        let retriever = VectorStoreRetriever::open(
            &config.workspace,
            &config.retrieval.collection,
            config.retrieval.top_k,
            embedding_key.as_deref(),
            timeout,
        )?;

        let search = create_search_client(&config.web_search, config.resolve_web_search_key())?;

        Ok(CragGraph::new(
            Arc::new(retriever),
            chains,
            search,
            GraphSettings::from(&config.workflow),
        ))
    }
}
