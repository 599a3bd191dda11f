//! Workflow state and partial updates.

use crag_knowledge::Document;
use serde::{Deserialize, Serialize};

/// Aggregate state of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    /// The user question; never changes during a run
    pub question: String,

    /// Context documents for generation
    pub documents: Vec<Document>,

    /// Latest answer; overwritten on regeneration
    pub generation: Option<String>,

    /// Set when the last grading pass rejected at least one document
    pub web_search: bool,
}

impl GraphState {
    /// Initial state holding only the question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: None,
            web_search: false,
        }
    }

    /// Merge a node's partial update; unset fields keep their value.
    pub fn apply(self, update: StateUpdate) -> Self {
        Self {
            question: self.question,
            documents: update.documents.unwrap_or(self.documents),
            generation: update.generation.or(self.generation),
            web_search: update.web_search.unwrap_or(self.web_search),
        }
    }
}

/// Fields a node wants to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub documents: Option<Vec<Document>>,
    pub generation: Option<String>,
    pub web_search: Option<bool>,
}

impl StateUpdate {
    pub fn documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = Some(generation.into());
        self
    }

    pub fn web_search(mut self, web_search: bool) -> Self {
        self.web_search = Some(web_search);
        self
    }
}
