//! The corrective RAG state machine.
//!
//! ```text
//! Retrieve -> GradeDocuments -+-> Generate -+-> End            (useful)
//!                             |      ^      +-> Generate       (not supported)
//!                             v      |      +-> WebSearch      (not useful)
//!                          WebSearch-+
//! ```

use crate::chains::{Chains, Grade};
use crate::search::{results_to_document, WebSearch};
use crate::state::{GraphState, StateUpdate};
use crag_core::config::WorkflowConfig;
use crag_core::{AppError, AppResult};
use crag_knowledge::{Document, Retriever};
use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Workflow nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Retrieve,
    GradeDocuments,
    WebSearch,
    Generate,
    End,
}

impl Node {
    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Retrieve => "retrieve",
            Node::GradeDocuments => "grade_documents",
            Node::WebSearch => "websearch",
            Node::Generate => "generate",
            Node::End => "end",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of grading a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationVerdict {
    /// Grounded and answers the question
    Useful,
    /// Grounded but does not answer the question
    NotUseful,
    /// Not grounded in the documents
    NotSupported,
}

impl GenerationVerdict {
    /// Node the workflow moves to after this verdict.
    pub fn next_node(self) -> Node {
        match self {
            GenerationVerdict::Useful => Node::End,
            GenerationVerdict::NotUseful => Node::WebSearch,
            GenerationVerdict::NotSupported => Node::Generate,
        }
    }
}

/// Route after document grading.
pub fn decide_to_generate(state: &GraphState) -> Node {
    info!("ASSESS GRADED DOCUMENTS");

    if state.web_search {
        info!("DECISION: NOT ALL DOCUMENTS ARE RELEVANT TO QUESTION, INCLUDE WEB SEARCH");
        Node::WebSearch
    } else {
        info!("DECISION: GENERATE");
        Node::Generate
    }
}

/// Runtime knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSettings {
    /// Node executions allowed per run; 0 means unbounded
    pub recursion_limit: usize,
    pub concurrent_grading: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        GraphSettings::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for GraphSettings {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            recursion_limit: config.recursion_limit,
            concurrent_grading: config.concurrent_grading,
        }
    }
}

/// Final state of a run plus the nodes it passed through, ending with `End`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphRun {
    pub state: GraphState,
    pub visited: Vec<Node>,
}

impl GraphRun {
    /// True if the run went through the web search node.
    pub fn used_web_search(&self) -> bool {
        self.visited.contains(&Node::WebSearch)
    }
}

/// Workflow controller.
pub struct CragGraph {
    retriever: Arc<dyn Retriever>,
    chains: Chains,
    search: Arc<dyn WebSearch>,
    settings: GraphSettings,
}

impl CragGraph {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        chains: Chains,
        search: Arc<dyn WebSearch>,
        settings: GraphSettings,
    ) -> Self {
        Self {
            retriever,
            chains,
            search,
            settings,
        }
    }

    pub fn settings(&self) -> GraphSettings {
        self.settings
    }

    /// Run the workflow and return the final state.
    pub async fn invoke(&self, question: &str) -> AppResult<GraphState> {
        Ok(self.run(question).await?.state)
    }

    /// Run the workflow, recording every visited node.
    #[instrument(skip(self))]
    pub async fn run(&self, question: &str) -> AppResult<GraphRun> {
        let mut state = GraphState::new(question);
        let mut visited = Vec::new();
        let mut node = Node::Retrieve;

        while node != Node::End {
            let limit = self.settings.recursion_limit;
            if limit > 0 && visited.len() >= limit {
                return Err(AppError::Workflow(format!(
                    "recursion limit of {} reached without hitting END",
                    limit
                )));
            }
            visited.push(node);

            node = match node {
                Node::Retrieve => {
                    let update = self.retrieve(&state).await?;
                    state = state.apply(update);
                    Node::GradeDocuments
                }
                Node::GradeDocuments => {
                    let update = self.grade_documents(&state).await?;
                    state = state.apply(update);
                    decide_to_generate(&state)
                }
                Node::WebSearch => {
                    let update = self.web_search(&state).await?;
                    state = state.apply(update);
                    Node::Generate
                }
                Node::Generate => {
                    let update = self.generate(&state).await?;
                    state = state.apply(update);
                    self.grade_generation(&state).await?.next_node()
                }
                Node::End => Node::End,
            };
        }

        visited.push(Node::End);

        tracing::debug!(
            "Run finished after {} nodes: {}",
            visited.len(),
            visited
                .iter()
                .map(Node::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(GraphRun { state, visited })
    }

    async fn retrieve(&self, state: &GraphState) -> AppResult<StateUpdate> {
        info!("RETRIEVE");
        let documents = self.retriever.retrieve(&state.question).await?;
        Ok(StateUpdate::default().documents(documents))
    }

    /// Keep the relevant documents; flag web search if any were dropped.
    async fn grade_documents(&self, state: &GraphState) -> AppResult<StateUpdate> {
        info!("CHECK DOCUMENT RELEVANCE TO QUESTION");

        let grader = &self.chains.retrieval_grader;
        let grades: Vec<AppResult<Grade>> = if self.settings.concurrent_grading {
            join_all(
                state
                    .documents
                    .iter()
                    .map(|doc| grader.grade(&state.question, &doc.page_content)),
            )
            .await
        } else {
            let mut grades = Vec::with_capacity(state.documents.len());
            for doc in &state.documents {
                grades.push(grader.grade(&state.question, &doc.page_content).await);
            }
            grades
        };

        let mut relevant: Vec<Document> = Vec::new();
        let mut web_search = false;
        for (doc, grade) in state.documents.iter().zip(grades) {
            if grade?.is_yes() {
                info!("GRADE: DOCUMENT RELEVANT");
                relevant.push(doc.clone());
            } else {
                info!("GRADE: DOCUMENT NOT RELEVANT");
                web_search = true;
            }
        }

        Ok(StateUpdate::default()
            .documents(relevant)
            .web_search(web_search))
    }

    async fn web_search(&self, state: &GraphState) -> AppResult<StateUpdate> {
        info!("WEB SEARCH");

        let results = self.search.search(&state.question).await?;
        let mut documents = state.documents.clone();
        if results.is_empty() {
            tracing::warn!("Web search returned no results");
        }
        documents.push(results_to_document(&results));

        Ok(StateUpdate::default().documents(documents))
    }

    async fn generate(&self, state: &GraphState) -> AppResult<StateUpdate> {
        info!("GENERATE");
        let generation = self
            .chains
            .generator
            .generate(&state.question, &state.documents)
            .await?;
        Ok(StateUpdate::default().generation(generation))
    }

    async fn grade_generation(&self, state: &GraphState) -> AppResult<GenerationVerdict> {
        info!("CHECK HALLUCINATIONS");

        let generation = state.generation.as_deref().ok_or_else(|| {
            AppError::Workflow("generation graded before it was produced".to_string())
        })?;

        let grounded = self
            .chains
            .hallucination_grader
            .grade(&state.documents, generation)
            .await?;

        if !grounded.is_yes() {
            info!("DECISION: GENERATION IS NOT GROUNDED IN DOCUMENTS, RE-TRY");
            return Ok(GenerationVerdict::NotSupported);
        }

        info!("DECISION: GENERATION IS GROUNDED IN DOCUMENTS");
        info!("GRADE GENERATION vs QUESTION");

        let answers = self
            .chains
            .answer_grader
            .grade(&state.question, generation)
            .await?;

        if answers.is_yes() {
            info!("DECISION: GENERATION ADDRESSES QUESTION");
            Ok(GenerationVerdict::Useful)
        } else {
            info!("DECISION: GENERATION DOES NOT ADDRESS QUESTION");
            Ok(GenerationVerdict::NotUseful)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_to_generate() {
        let mut state = GraphState::new("q");
        assert_eq!(decide_to_generate(&state), Node::Generate);

        state.web_search = true;
        assert_eq!(decide_to_generate(&state), Node::WebSearch);
    }

    #[test]
    fn test_verdict_routing() {
        assert_eq!(GenerationVerdict::Useful.next_node(), Node::End);
        assert_eq!(GenerationVerdict::NotUseful.next_node(), Node::WebSearch);
        assert_eq!(GenerationVerdict::NotSupported.next_node(), Node::Generate);
    }

    #[test]
    fn test_default_settings() {
        let settings = GraphSettings::default();
        assert_eq!(settings.recursion_limit, 25);
        assert!(settings.concurrent_grading);
    }
}
