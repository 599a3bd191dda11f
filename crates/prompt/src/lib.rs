//! Prompt system for C-RAG.
//!
//! This crate provides structured prompt management with:
//! - Built-in definitions for the grader and generation chains
//! - YAML overrides under `.crag/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, OutputFormat, PromptDefinition, PromptInputSpec,
    PromptOutputSpec,
};
