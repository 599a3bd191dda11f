//! Built-in prompt definitions for the grading and generation chains.
//!
//! A workspace can override any of these by placing `<id>.yml` under
//! `.crag/prompts/`.

use crate::types::PromptDefinition;
use crag_core::AppResult;

/// Relevance of a retrieved document to the question.
pub const RETRIEVAL_GRADER: &str = "grader.retrieval";

/// Groundedness of a generation in the retrieved facts.
pub const HALLUCINATION_GRADER: &str = "grader.hallucination";

/// Whether a generation resolves the question.
pub const ANSWER_GRADER: &str = "grader.answer";

/// Answer generation from retrieved context.
pub const GENERATION: &str = "rag.generate";

const RETRIEVAL_GRADER_YAML: &str = r#"
id: grader.retrieval
title: Retrieval relevance grader
apiVersion: "1.0"
createdBy: crag
system: |-
  You are a grader assessing relevance of a retrieved document to a user question.
  If the document contains keyword(s) or semantic meaning related to the question, grade it as relevant.
  Give a binary score 'yes' or 'no' score to indicate whether the document is relevant to the question.
input:
  variables: [document, question]
template: |-
  Retrieved document:

  {{document}}

  User question: {{question}}
output:
  format: binary_score
"#;

const HALLUCINATION_GRADER_YAML: &str = r#"
id: grader.hallucination
title: Hallucination grader
apiVersion: "1.0"
createdBy: crag
system: |-
  You are a grader assessing whether an LLM generation is grounded in / supported by a set of retrieved facts.
  Give a binary score 'yes' or 'no'. 'yes' means that answer is grounded in the facts, 'no' means that answer is not grounded in the facts.
input:
  variables: [generation, documents]
template: |-
  LLM generation:

  {{generation}}

  Retrieved facts: {{documents}}
output:
  format: binary_score
"#;

const ANSWER_GRADER_YAML: &str = r#"
id: grader.answer
title: Answer quality grader
apiVersion: "1.0"
createdBy: crag
system: |-
  You are a grader assessing whether an answer addresses / resolves a question.
  If the answer is correct, grade it as correct.
  Give a binary score 'yes' or 'no' score to indicate whether the answer is correct.
input:
  variables: [generation, question]
template: |-
  Answer:

  {{generation}}

  Question: {{question}}
output:
  format: binary_score
"#;

const GENERATION_YAML: &str = r#"
id: rag.generate
title: RAG answer generation
apiVersion: "1.0"
createdBy: crag
input:
  variables: [question, context]
template: |-
  You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question. If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.
  Question: {{question}}
  Context: {{context}}
  Answer:
output:
  format: text
"#;

/// Identifiers of every built-in prompt.
pub const BUILTIN_IDS: [&str; 4] = [
    RETRIEVAL_GRADER,
    HALLUCINATION_GRADER,
    ANSWER_GRADER,
    GENERATION,
];

/// Look up a built-in prompt by id.
///
/// Returns `None` for unknown ids.
pub fn builtin_prompt(id: &str) -> Option<AppResult<PromptDefinition>> {
    let yaml = match id {
        RETRIEVAL_GRADER => RETRIEVAL_GRADER_YAML,
        HALLUCINATION_GRADER => HALLUCINATION_GRADER_YAML,
        ANSWER_GRADER => ANSWER_GRADER_YAML,
        GENERATION => GENERATION_YAML,
        _ => return None,
    };

    Some(serde_yaml::from_str(yaml).map_err(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputFormat;

    #[test]
    fn test_all_builtins_parse() {
        for id in BUILTIN_IDS {
            let def = builtin_prompt(id).unwrap().unwrap();
            assert_eq!(def.id, id);
            assert!(!def.template.is_empty());
        }
    }

    #[test]
    fn test_grader_prompts_expect_binary_score() {
        for id in [RETRIEVAL_GRADER, HALLUCINATION_GRADER, ANSWER_GRADER] {
            let def = builtin_prompt(id).unwrap().unwrap();
            assert_eq!(def.output.format, OutputFormat::BinaryScore);
            assert!(def.system.is_some());
        }

        let generation = builtin_prompt(GENERATION).unwrap().unwrap();
        assert_eq!(generation.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("agent.ask.default").is_none());
    }
}
