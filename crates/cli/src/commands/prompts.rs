//! Prompts command handler.

use clap::Args;
use crag_core::{config::AppConfig, AppResult};
use crag_prompt::{list_prompts, load_prompt};

/// List prompt ids (built-in and workspace overrides)
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Show each prompt's title
    #[arg(short, long)]
    pub long: bool,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        for id in list_prompts(&config.workspace)? {
            if !self.long {
                println!("{}", id);
                continue;
            }

            match load_prompt(&config.workspace, &id) {
                Ok(prompt) => println!("{:<24} {}", id, prompt.title),
                Err(e) => {
                    tracing::warn!("Prompt '{}' failed to load: {}", id, e);
                    println!("{:<24} (invalid: {})", id, e);
                }
            }
        }

        Ok(())
    }
}
