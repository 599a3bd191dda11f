//! C-RAG CLI
//!
//! Main entry point for the `crag` command-line tool: corrective
//! retrieval-augmented generation over a local document index with web
//! search fallback.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, CleanCommand, IngestCommand, PromptsCommand, StatsCommand,
};
use crag_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// C-RAG - corrective retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "crag")]
#[command(about = "Corrective retrieval-augmented generation with web search fallback", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.crag/config.yaml)
    #[arg(short, long, global = true, env = "CRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "CRAG_PROVIDER")]
    provider: Option<String>,

    /// Generation model
    #[arg(short, long, global = true, env = "CRAG_MODEL")]
    model: Option<String>,

    /// Model used by the graders
    #[arg(long, global = true, env = "CRAG_GRADER_MODEL")]
    grader_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question and print the final state
    Ask(AskCommand),

    /// Answer questions read from stdin
    Chat(ChatCommand),

    /// Build the document index
    Ingest(IngestCommand),

    /// Empty the document index
    Clean(CleanCommand),

    /// Show document index statistics
    Stats(StatsCommand),

    /// List prompt ids
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Ingest(_) => "ingest",
            Commands::Clean(_) => "clean",
            Commands::Stats(_) => "stats",
            Commands::Prompts(_) => "prompts",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())
        .context("Failed to load configuration")?
        .with_overrides(
            cli.workspace,
            cli.config,
            cli.provider,
            cli.model,
            cli.grader_model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("C-RAG CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {} (grader: {})", config.model, config.grader_model);

    config.ensure_crag_dir()?;

    let command_name = cli.command.name();
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Clean(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("crag {} failed", command_name))
}
