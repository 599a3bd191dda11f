//! Workflow routing against scripted collaborators.

use super::fakes::{
    build_graph, docs, score_json, Chain, FakeSearch, ScriptedLlm, GENERATION_MODEL, GRADER_MODEL,
};
use crate::graph::{GraphSettings, Node};
use crag_core::AppError;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn settings(recursion_limit: usize, concurrent_grading: bool) -> GraphSettings {
    GraphSettings {
        recursion_limit,
        concurrent_grading,
    }
}

#[tokio::test]
async fn test_all_relevant_generates_directly() {
    let llm = Arc::new(ScriptedLlm::approving());
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm.clone(),
        docs(&["LCEL is a declarative way to compose chains", "LCEL supports streaming"]),
        search.clone(),
        GraphSettings::default(),
    );

    let run = graph.run("what is lcel?").await.unwrap();

    assert_eq!(
        run.visited,
        vec![Node::Retrieve, Node::GradeDocuments, Node::Generate, Node::End]
    );
    assert!(!run.state.web_search);
    assert_eq!(run.state.documents.len(), 2);
    assert_eq!(run.state.generation.as_deref(), Some("generation 1"));
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_irrelevant_document_triggers_web_search() {
    let llm = Arc::new(ScriptedLlm::approving().rejecting("pancakes"));
    let search = Arc::new(FakeSearch::returning(&["LCEL snippet one", "LCEL snippet two"]));
    let graph = build_graph(
        llm,
        docs(&["LCEL composes runnables", "How to make pancakes"]),
        search.clone(),
        GraphSettings::default(),
    );

    let run = graph.run("what is lcel?").await.unwrap();

    assert_eq!(
        run.visited,
        vec![
            Node::Retrieve,
            Node::GradeDocuments,
            Node::WebSearch,
            Node::Generate,
            Node::End
        ]
    );
    assert!(run.state.web_search);
    assert!(run.used_web_search());

    let documents = &run.state.documents;
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].page_content, "LCEL composes runnables");
    assert_eq!(documents[1].page_content, "LCEL snippet one\nLCEL snippet two");
    assert!(documents[1].metadata.is_empty());
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_documents_generates_without_web_search() {
    let llm = Arc::new(ScriptedLlm::approving());
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(llm, Vec::new(), search.clone(), GraphSettings::default());

    let state = graph.invoke("what is lcel?").await.unwrap();

    assert!(!state.web_search);
    assert!(state.documents.is_empty());
    assert!(state.generation.is_some());
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ungrounded_generation_is_regenerated() {
    let llm = Arc::new(ScriptedLlm::approving().with_hallucination(&["no", "no"], "yes"));
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm.clone(),
        docs(&["LCEL composes runnables"]),
        search,
        GraphSettings::default(),
    );

    let run = graph.run("what is lcel?").await.unwrap();

    assert_eq!(
        run.visited,
        vec![
            Node::Retrieve,
            Node::GradeDocuments,
            Node::Generate,
            Node::Generate,
            Node::Generate,
            Node::End
        ]
    );
    assert_eq!(run.state.generation.as_deref(), Some("generation 3"));
    // Answer grading only happens once the generation is grounded
    assert_eq!(llm.calls(Chain::Answer).len(), 1);
}

#[tokio::test]
async fn test_unhelpful_generation_falls_back_to_web_search() {
    let llm = Arc::new(ScriptedLlm::approving().with_answer(&["no"], "yes"));
    let search = Arc::new(FakeSearch::returning(&["fresh web context"]));
    let graph = build_graph(
        llm,
        docs(&["LCEL composes runnables"]),
        search.clone(),
        GraphSettings::default(),
    );

    let run = graph.run("what is lcel?").await.unwrap();

    assert_eq!(
        run.visited,
        vec![
            Node::Retrieve,
            Node::GradeDocuments,
            Node::Generate,
            Node::WebSearch,
            Node::Generate,
            Node::End
        ]
    );
    // web_search reflects the grading pass, not the fallback
    assert!(!run.state.web_search);
    assert_eq!(run.state.documents.len(), 2);
    assert_eq!(run.state.documents[1].page_content, "fresh web context");
    assert_eq!(run.state.generation.as_deref(), Some("generation 2"));
}

#[tokio::test]
async fn test_recursion_limit_stops_endless_regeneration() {
    let llm = Arc::new(ScriptedLlm::approving().with_hallucination(&[], "no"));
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm.clone(),
        docs(&["LCEL composes runnables"]),
        search,
        settings(5, true),
    );

    let err = graph.invoke("what is lcel?").await.unwrap_err();

    assert!(matches!(err, AppError::Workflow(_)));
    assert!(err.to_string().contains("recursion limit of 5"));
    // Retrieve, GradeDocuments, then three generations
    assert_eq!(llm.calls(Chain::Generation).len(), 3);
}

#[tokio::test]
async fn test_zero_recursion_limit_is_unbounded() {
    let no_votes = vec!["no"; 30];
    let llm = Arc::new(ScriptedLlm::approving().with_hallucination(&no_votes, "yes"));
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm,
        docs(&["LCEL composes runnables"]),
        search,
        settings(0, true),
    );

    let run = graph.run("what is lcel?").await.unwrap();

    assert_eq!(run.visited.len(), 2 + 31 + 1);
    assert_eq!(run.state.generation.as_deref(), Some("generation 31"));
}

#[tokio::test]
async fn test_filtered_documents_match_with_and_without_concurrency() {
    let corpus = docs(&[
        "LCEL composes runnables",
        "Pancakes need flour",
        "LCEL supports batch and stream",
        "Pancakes need eggs",
    ]);

    let mut results = Vec::new();
    for concurrent in [true, false] {
        let llm = Arc::new(ScriptedLlm::approving().rejecting("Pancakes"));
        let search = Arc::new(FakeSearch::returning(&[]));
        let graph = build_graph(llm.clone(), corpus.clone(), search, settings(25, concurrent));

        let state = graph.invoke("what is lcel?").await.unwrap();
        assert_eq!(llm.calls(Chain::Relevance).len(), 4);
        results.push(state);
    }

    for state in &results {
        assert!(state.web_search);
        let contents: Vec<&str> = state
            .documents
            .iter()
            .map(|d| d.page_content.as_str())
            .collect();
        // Empty web results still add one blank document
        assert_eq!(
            contents,
            vec!["LCEL composes runnables", "LCEL supports batch and stream", ""]
        );
        assert!(state.documents[2].metadata.is_empty());
    }
    assert_eq!(results[0], results[1]);
}

#[tokio::test]
async fn test_unexpected_score_counts_as_irrelevant() {
    let llm = Arc::new(ScriptedLlm::approving().with_relevance(|_| score_json("maybe")));
    let search = Arc::new(FakeSearch::returning(&["web context"]));
    let graph = build_graph(
        llm,
        docs(&["LCEL composes runnables"]),
        search.clone(),
        GraphSettings::default(),
    );

    let state = graph.invoke("what is lcel?").await.unwrap();

    assert!(state.web_search);
    assert_eq!(state.documents.len(), 1);
    assert_eq!(state.documents[0].page_content, "web context");
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_grader_output_is_an_error() {
    let llm = Arc::new(ScriptedLlm::approving().with_relevance(|_| "Yes!".to_string()));
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm,
        docs(&["LCEL composes runnables"]),
        search,
        GraphSettings::default(),
    );

    let err = graph.invoke("what is lcel?").await.unwrap_err();
    assert!(matches!(err, AppError::Llm(_)));
}

#[tokio::test]
async fn test_search_failure_propagates() {
    let llm = Arc::new(ScriptedLlm::approving().rejecting("pancakes"));
    let search = Arc::new(FakeSearch::failing());
    let graph = build_graph(
        llm,
        docs(&["pancakes"]),
        search,
        GraphSettings::default(),
    );

    let err = graph.invoke("what is lcel?").await.unwrap_err();
    assert!(matches!(err, AppError::Search(_)));
}

#[tokio::test]
async fn test_graders_and_generator_use_their_models() {
    let llm = Arc::new(ScriptedLlm::approving());
    let search = Arc::new(FakeSearch::returning(&["unused"]));
    let graph = build_graph(
        llm.clone(),
        docs(&["LCEL composes runnables"]),
        search,
        GraphSettings::default(),
    );

    graph.invoke("what is lcel?").await.unwrap();

    assert_eq!(llm.calls(Chain::Generation), vec![GENERATION_MODEL]);
    for chain in [Chain::Relevance, Chain::Hallucination, Chain::Answer] {
        let models = llm.calls(chain);
        assert_eq!(models.len(), 1);
        assert!(models.iter().all(|m| m == GRADER_MODEL));
    }
}
