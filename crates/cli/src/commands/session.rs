//! Interactive session command.
//!
//! Free text replaces the current question; slash commands submit it,
//! change the temperature or redisplay the last answer.

use clap::Args;
use smartsearch_core::{config::AppConfig, AppResult};
use smartsearch_search::rag::render_markdown;
use smartsearch_search::{AnswerMode, QaService, Session};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type a question to replace the current one, then submit it:
  /quick        quick answer from result captions
  /best         best answer from every page of the relevant documents
  /temp <v>     set the temperature (0.0-1.0)
  /show         show the current question and last answer
  /help         show this help
  /quit         leave the session";

/// Ask questions interactively
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// Index to query instead of the configured ones (repeatable)
    #[arg(short, long = "index")]
    pub indexes: Vec<String>,
}

/// One line of session input.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Query(String),
    Submit(AnswerMode),
    Temperature(String),
    Show,
    Help,
    Quit,
    Blank,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Query(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "quick" => Input::Submit(AnswerMode::Quick),
        "best" => Input::Submit(AnswerMode::Best),
        "temp" => Input::Temperature(arg.to_string()),
        "show" => Input::Show,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

impl SessionCommand {
    /// Execute the session command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive session");

        let config = config.with_indexes(self.indexes.clone());
        let qa = QaService::from_config(&config)?;
        let mut session = Session::new();

        println!("{}", HELP);
        show(&session);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Blank => {}
                Input::Query(query) => {
                    if session.set_query(&query) {
                        tracing::debug!("Question changed");
                    }
                }
                Input::Submit(mode) => {
                    session.mark_submitted();
                    eprintln!("{}", mode.progress_message());
                    match qa.ask(session.query(), mode, session.temperature()).await {
                        Ok(outcome) => {
                            session.record(outcome);
                            show(&session);
                        }
                        // The session survives a failed request
                        Err(e) => {
                            tracing::warn!("Request failed: {}", e);
                            eprintln!("Error: {}", e);
                        }
                    }
                }
                Input::Temperature(value) => match value.parse::<f32>() {
                    Ok(t) => match session.set_temperature(t) {
                        Ok(()) => println!("Temperature set to {}", session.temperature()),
                        Err(e) => eprintln!("{}", e),
                    },
                    Err(_) => eprintln!("Not a number: '{}'", value),
                },
                Input::Show => show(&session),
                Input::Help => println!("{}", HELP),
                Input::Quit => break,
                Input::Unknown(name) => eprintln!("Unknown command '/{}'. Type /help", name),
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }
}

/// Print the current question and, once submitted, the last answer.
fn show(session: &Session) {
    println!(
        "Question: {}  (temperature {})",
        session.query(),
        session.temperature()
    );
    if let Some(outcome) = session.displayed() {
        print!("{}", render_markdown(outcome));
    }
}
