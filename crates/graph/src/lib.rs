//! Corrective RAG workflow.
//!
//! Retrieves documents, grades their relevance, falls back to web search when
//! retrieval is insufficient, generates an answer and grades it for
//! groundedness and usefulness before returning.
//!
//! # Example
//! ```no_run
//! use crag_core::AppConfig;
//! use crag_graph::CragGraph;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let graph = CragGraph::from_config(&config)?;
//! let state = graph.invoke("what is lcel?").await?;
//! println!("{}", state.generation.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod chains;
pub mod graph;
pub mod search;
pub mod state;

#[cfg(test)]
mod tests;

pub use chains::{Chains, Grade};
pub use graph::{decide_to_generate, CragGraph, GenerationVerdict, GraphRun, GraphSettings, Node};
pub use search::{create_search_client, results_to_document, SearchResult, TavilySearch, WebSearch};
pub use state::{GraphState, StateUpdate};
