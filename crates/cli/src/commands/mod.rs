//! Command handlers for the C-RAG CLI.
//!
//! Each subcommand lives in its own module.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod prompts;
pub mod report;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::{CleanCommand, IngestCommand};
pub use prompts::PromptsCommand;
pub use stats::StatsCommand;
