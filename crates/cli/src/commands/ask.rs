//! Ask command handler.
//!
//! Runs the workflow once and prints the final state.

use super::report;
use clap::Args;
use crag_core::{config::AppConfig, AppError, AppResult};
use crag_graph::CragGraph;

/// Question asked when none is given.
pub const DEFAULT_QUESTION: &str = "what is lcel?";

/// Run the corrective RAG workflow for one question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(default_value = DEFAULT_QUESTION)]
    pub question: String,

    /// Render answer, workflow details and sources instead of JSON
    #[arg(long)]
    pub report: bool,

    /// Include the visited workflow nodes
    #[arg(long)]
    pub trace: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("Please enter a question".to_string()));
        }

        config.validate()?;
        let graph = CragGraph::from_config(config)?;
        let run = graph.run(question).await?;

        if self.report {
            print!("{}", report::render(&run, self.trace));
            return Ok(());
        }

        let json = if self.trace {
            serde_json::to_string_pretty(&run)?
        } else {
            serde_json::to_string_pretty(&run.state)?
        };
        println!("{}", json);

        Ok(())
    }
}
