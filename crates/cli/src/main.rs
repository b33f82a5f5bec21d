//! Smart Search CLI
//!
//! Main entry point for the smartsearch command-line tool.
//! Asks questions against hosted search indexes and answers them with a
//! chat model, citing the documents used.

mod commands;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use commands::{AboutCommand, AskCommand, SessionCommand};
use smartsearch_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Smart Search - question answering over your enterprise documents
#[derive(Parser, Debug)]
#[command(name = "smartsearch")]
#[command(about = "Question answering over Azure Cognitive Search indexes", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SMARTSEARCH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SMARTSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question and exit
    Ask(AskCommand),

    /// Ask questions interactively
    Session(SessionCommand),

    /// How to use Smart Search, and what it is configured to query
    About(AboutCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Workspace and config file flags decide where configuration is read from
    let workspace = cli.workspace.map(|p| p.to_string_lossy().into_owned());
    let config_file = cli.config.map(|p| p.to_string_lossy().into_owned());
    let config = AppConfig::load_with(|name| match name {
        "SMARTSEARCH_WORKSPACE" => workspace.clone(),
        "SMARTSEARCH_CONFIG" => config_file.clone(),
        _ => std::env::var(name).ok(),
    })?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Smart Search CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Indexes: {:?}", config.search.indexes);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Session(_) => "session",
        Commands::About(_) => "about",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(config).await,
        Commands::Session(cmd) => cmd.execute(config).await,
        Commands::About(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
