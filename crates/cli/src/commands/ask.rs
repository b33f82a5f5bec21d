//! Ask command handler.
//!
//! Answers a single question and prints the answer with its sources and
//! the search results it was drawn from.

use clap::{Args, ValueEnum};
use smartsearch_core::{config::AppConfig, AppResult};
use smartsearch_search::rag::{render_json, render_markdown, DEFAULT_TEMPERATURE};
use smartsearch_search::session::DEFAULT_QUERY;
use smartsearch_search::{AnswerMode, QaService};

/// Answer mode as a command-line value.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Single pass over result captions
    Quick,
    /// Read every page of every relevant document
    Best,
}

impl From<ModeArg> for AnswerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Quick => AnswerMode::Quick,
            ModeArg::Best => AnswerMode::Best,
        }
    }
}

/// Answer one question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(default_value = DEFAULT_QUERY)]
    pub query: String,

    /// How thoroughly to read the retrieved documents
    #[arg(short, long, value_enum, default_value_t = ModeArg::Quick)]
    pub mode: ModeArg,

    /// Sampling temperature (0.0-1.0)
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Index to query instead of the configured ones (repeatable)
    #[arg(short, long = "index")]
    pub indexes: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let config = config.with_indexes(self.indexes.clone());
        let qa = QaService::from_config(&config)?;

        let mode = AnswerMode::from(self.mode);
        if !self.json {
            eprintln!("{}", mode.progress_message());
        }

        let outcome = qa.ask(&self.query, mode, self.temperature).await?;

        if let Some(usage) = outcome.usage {
            tracing::debug!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        if self.json {
            println!("{}", render_json(&outcome)?);
        } else {
            print!("{}", render_markdown(&outcome));
        }

        Ok(())
    }
}
