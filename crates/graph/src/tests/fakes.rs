//! Scripted in-process collaborators for workflow tests.

use crate::chains::Chains;
use crate::graph::{CragGraph, GraphSettings};
use crate::search::{SearchResult, WebSearch};
use async_trait::async_trait;
use crag_core::{AppError, AppResult};
use crag_knowledge::{Document, Retriever};
use crag_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const GENERATION_MODEL: &str = "gen-model";
pub const GRADER_MODEL: &str = "grader-model";

/// Which chain issued a request, recognised by its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Relevance,
    Hallucination,
    Answer,
    Generation,
}

fn classify(request: &LlmRequest) -> Chain {
    match request.system.as_deref() {
        Some(s) if s.contains("relevance of a retrieved document") => Chain::Relevance,
        Some(s) if s.contains("grounded in / supported by") => Chain::Hallucination,
        Some(s) if s.contains("addresses / resolves") => Chain::Answer,
        _ => Chain::Generation,
    }
}

/// Queue of grader outputs, falling back to a fixed output once drained.
struct Scores {
    queue: VecDeque<String>,
    fallback: String,
}

impl Scores {
    fn new(scores: &[&str], fallback: &str) -> Self {
        Self {
            queue: scores.iter().map(|s| score_json(s)).collect(),
            fallback: score_json(fallback),
        }
    }

    fn next(&mut self) -> String {
        self.queue.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn score_json(score: &str) -> String {
    format!(r#"{{"binary_score": "{}"}}"#, score)
}

type RelevanceFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// LLM fake answering each chain from a script.
pub struct ScriptedLlm {
    relevance: RelevanceFn,
    hallucination: Mutex<Scores>,
    answer: Mutex<Scores>,
    generations: AtomicUsize,
    calls: Mutex<Vec<(Chain, String)>>,
}

impl ScriptedLlm {
    /// Every document relevant, every generation grounded and useful.
    pub fn approving() -> Self {
        Self {
            relevance: Box::new(|_| score_json("yes")),
            hallucination: Mutex::new(Scores::new(&[], "yes")),
            answer: Mutex::new(Scores::new(&[], "yes")),
            generations: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Documents whose prompt mentions `marker` are graded irrelevant.
    pub fn rejecting(self, marker: &'static str) -> Self {
        self.with_relevance(move |prompt| {
            if prompt.contains(marker) {
                score_json("no")
            } else {
                score_json("yes")
            }
        })
    }

    /// Raw relevance output as a function of the rendered user prompt.
    pub fn with_relevance(
        mut self,
        relevance: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.relevance = Box::new(relevance);
        self
    }

    pub fn with_hallucination(self, scores: &[&str], fallback: &str) -> Self {
        *self.hallucination.lock().unwrap() = Scores::new(scores, fallback);
        self
    }

    pub fn with_answer(self, scores: &[&str], fallback: &str) -> Self {
        *self.answer.lock().unwrap() = Scores::new(scores, fallback);
        self
    }

    pub fn calls(&self, chain: Chain) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chain)
            .map(|(_, model)| model.clone())
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let chain = classify(request);
        self.calls
            .lock()
            .unwrap()
            .push((chain, request.model.clone()));

        let content = match chain {
            Chain::Relevance => (self.relevance)(&request.prompt),
            Chain::Hallucination => self.hallucination.lock().unwrap().next(),
            Chain::Answer => self.answer.lock().unwrap().next(),
            Chain::Generation => {
                let n = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
                format!("generation {}", n)
            }
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }
}

/// Retriever returning a fixed document list.
pub struct StaticRetriever(pub Vec<Document>);

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str) -> AppResult<Vec<Document>> {
        Ok(self.0.clone())
    }
}

/// Web search returning fixed snippets and counting calls.
pub struct FakeSearch {
    contents: Vec<&'static str>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(contents: &[&'static str]) -> Self {
        Self {
            contents: contents.to_vec(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            contents: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, _query: &str) -> AppResult<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Search("search backend unavailable".to_string()));
        }

        Ok(self
            .contents
            .iter()
            .enumerate()
            .map(|(i, content)| SearchResult {
                title: format!("result {}", i),
                url: format!("https://search.test/{}", i),
                content: content.to_string(),
                score: None,
            })
            .collect())
    }
}

/// Indexed-looking documents.
pub fn docs(contents: &[&str]) -> Vec<Document> {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| Document::with_source(*c, format!("https://blog.test/post-{}", i)))
        .collect()
}

/// Assemble a graph over the fakes using the built-in prompts.
pub fn build_graph(
    llm: Arc<ScriptedLlm>,
    documents: Vec<Document>,
    search: Arc<FakeSearch>,
    settings: GraphSettings,
) -> CragGraph {
    let workspace = TempDir::new().unwrap();
    let chains = Chains::load(workspace.path(), llm, GENERATION_MODEL, GRADER_MODEL).unwrap();

    CragGraph::new(
        Arc::new(StaticRetriever(documents)),
        chains,
        search,
        settings,
    )
}
