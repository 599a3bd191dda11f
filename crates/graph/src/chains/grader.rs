//! Binary graders backed by structured LLM output.

use super::format_docs;
use crag_core::{AppError, AppResult};
use crag_knowledge::Document;
use crag_llm::{LlmClient, LlmRequest};
use crag_prompt::{build_prompt, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A yes/no judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Yes,
    No,
}

impl Grade {
    /// Case-insensitive `"yes"` is `Yes`; anything else is `No`.
    pub fn from_score(score: &str) -> Self {
        if score.trim().eq_ignore_ascii_case("yes") {
            Grade::Yes
        } else {
            Grade::No
        }
    }

    pub fn is_yes(self) -> bool {
        self == Grade::Yes
    }
}

/// Structured output every grader asks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryScore {
    pub binary_score: String,
}

/// JSON schema for [`BinaryScore`].
pub fn binary_score_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "binary_score": {
                "type": "string",
                "description": "Binary score, 'yes' or 'no'"
            }
        },
        "required": ["binary_score"],
        "additionalProperties": false
    })
}

/// Parse a grader response into a [`Grade`].
///
/// Output that is not a JSON object with a string `binary_score` breaks the
/// remote contract and is reported as an LLM error.
pub fn parse_grade(content: &str) -> AppResult<Grade> {
    let score: BinaryScore = serde_json::from_str(content.trim())
        .map_err(|e| AppError::Llm(format!("Grader returned malformed output: {}", e)))?;

    Ok(Grade::from_score(&score.binary_score))
}

/// Shared machinery: render a prompt, request a binary score, parse it.
#[derive(Clone)]
struct BinaryGrader {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl BinaryGrader {
    async fn grade(&self, variables: HashMap<String, String>) -> AppResult<Grade> {
        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, &self.model)
            .with_temperature(0.0)
            .with_json_schema("binary_score", binary_score_schema());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        let grade = parse_grade(&response.content)?;

        tracing::debug!(prompt = %self.prompt.id, ?grade, "grader verdict");
        Ok(grade)
    }
}

fn vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Is a retrieved document relevant to the question?
#[derive(Clone)]
pub struct RetrievalGrader(BinaryGrader);

impl RetrievalGrader {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self(BinaryGrader {
            client,
            model: model.into(),
            prompt,
        })
    }

    pub async fn grade(&self, question: &str, document: &str) -> AppResult<Grade> {
        self.0
            .grade(vars([("question", question), ("document", document)]))
            .await
    }
}

/// Is a generation grounded in the documents it was generated from?
#[derive(Clone)]
pub struct HallucinationGrader(BinaryGrader);

impl HallucinationGrader {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self(BinaryGrader {
            client,
            model: model.into(),
            prompt,
        })
    }

    pub async fn grade(&self, documents: &[Document], generation: &str) -> AppResult<Grade> {
        let documents = format_docs(documents);
        self.0
            .grade(vars([("documents", documents.as_str()), ("generation", generation)]))
            .await
    }
}

/// Does a generation resolve the question?
#[derive(Clone)]
pub struct AnswerGrader(BinaryGrader);

impl AnswerGrader {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self(BinaryGrader {
            client,
            model: model.into(),
            prompt,
        })
    }

    pub async fn grade(&self, question: &str, generation: &str) -> AppResult<Grade> {
        self.0
            .grade(vars([("question", question), ("generation", generation)]))
            .await
    }
}
