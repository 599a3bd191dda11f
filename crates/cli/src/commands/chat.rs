//! Chat command handler.
//!
//! Reads questions from stdin until `exit`, `quit` or end of input. A failed
//! turn is reported and the session continues.

use super::report;
use clap::Args;
use crag_core::{config::AppConfig, AppResult};
use crag_graph::CragGraph;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question loop over the workflow
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Include the visited workflow nodes in each answer
    #[arg(long)]
    pub trace: bool,
}

/// What to do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Turn<'a> {
    Ask(&'a str),
    Skip,
    Exit,
}

fn classify(line: &str) -> Turn<'_> {
    let input = line.trim();
    if input.is_empty() {
        Turn::Skip
    } else if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        Turn::Exit
    } else {
        Turn::Ask(input)
    }
}

fn prompt() {
    print!("\nquestion> ");
    std::io::stdout().flush().ok();
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        config.validate()?;
        let graph = CragGraph::from_config(config)?;

        println!("C-RAG chat. Type 'exit' or 'quit' to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut turns = 0usize;
        loop {
            prompt();
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let question = match classify(&line) {
                Turn::Ask(question) => question,
                Turn::Skip => continue,
                Turn::Exit => break,
            };

            turns += 1;
            match graph.run(question).await {
                Ok(run) => print!("{}", report::render(&run, self.trace)),
                Err(e) => {
                    tracing::error!("Turn {} failed: {}", turns, e);
                    println!("Error: {}", e);
                }
            }
        }

        tracing::debug!("Chat session ended after {} questions", turns);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("  what is lcel?\n"), Turn::Ask("what is lcel?"));
        assert_eq!(classify("   "), Turn::Skip);
        assert_eq!(classify(""), Turn::Skip);
        assert_eq!(classify("exit"), Turn::Exit);
        assert_eq!(classify(" QUIT "), Turn::Exit);
        assert_eq!(classify("exit strategy"), Turn::Ask("exit strategy"));
    }
}
