//! LLM chains: the three graders and the answer generator.

pub mod generation;
pub mod grader;

pub use generation::Generator;
pub use grader::{
    binary_score_schema, parse_grade, AnswerGrader, BinaryScore, Grade, HallucinationGrader,
    RetrievalGrader,
};

use crag_core::AppResult;
use crag_knowledge::Document;
use crag_llm::LlmClient;
use crag_prompt::{builtin, load_prompt};
use std::path::Path;
use std::sync::Arc;

/// Join document contents into one context block.
pub fn format_docs(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every chain the workflow needs.
#[derive(Clone)]
pub struct Chains {
    pub retrieval_grader: RetrievalGrader,
    pub hallucination_grader: HallucinationGrader,
    pub answer_grader: AnswerGrader,
    pub generator: Generator,
}

impl Chains {
    /// Load prompts (workspace overrides first) and bind them to `client`.
    ///
    /// Graders run on `grader_model`, the generator on `model`.
    pub fn load(
        workspace: &Path,
        client: Arc<dyn LlmClient>,
        model: &str,
        grader_model: &str,
    ) -> AppResult<Self> {
        Ok(Self {
            retrieval_grader: RetrievalGrader::new(
                client.clone(),
                grader_model,
                load_prompt(workspace, builtin::RETRIEVAL_GRADER)?,
            ),
            hallucination_grader: HallucinationGrader::new(
                client.clone(),
                grader_model,
                load_prompt(workspace, builtin::HALLUCINATION_GRADER)?,
            ),
            answer_grader: AnswerGrader::new(
                client.clone(),
                grader_model,
                load_prompt(workspace, builtin::ANSWER_GRADER)?,
            ),
            generator: Generator::new(client, model, load_prompt(workspace, builtin::GENERATION)?),
        })
    }
}
