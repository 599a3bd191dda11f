//! LLM integration crate for C-RAG.
//!
//! This crate provides a provider-agnostic abstraction for the hosted models
//! that grade documents, generate answers and grade generations.
//!
//! # Providers
//! - **OpenAI**: Chat Completions with JSON-schema structured output (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use crag_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new("What is LCEL?", "gpt-4.1-nano");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, ResponseFormat};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
