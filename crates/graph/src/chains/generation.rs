//! Answer generation from retrieved context.

use super::format_docs;
use crag_core::AppResult;
use crag_knowledge::Document;
use crag_llm::{LlmClient, LlmRequest};
use crag_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Generates a concise answer to a question from context documents.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    pub async fn generate(&self, question: &str, documents: &[Document]) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), format_docs(documents));

        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        if !response.done {
            tracing::warn!("Generation was truncated by the model's token limit");
        }

        Ok(response.content.trim().to_string())
    }
}
