//! About command handler.

use clap::Args;
use smartsearch_core::{config::AppConfig, AppResult};
use smartsearch_prompt::{list_prompts, PromptOrigin};

const INSTRUCTIONS: &str = "\
Smart Search answers questions from the documents in your search indexes.

  Quick answer   reads the short caption of each relevant result and
                 answers in a single pass.
  Best answer    reads every page of every relevant document, pulls out
                 what matters for the question, then combines it.

Each answer lists the documents it cites, followed by the search results
it was drawn from and their relevance scores.

Example questions:
  What is CLP?
  How can I load JSON data into a table?
  What are the differences between standard and secure views?";

/// How to use Smart Search, and what it is configured to query
#[derive(Args, Debug)]
pub struct AboutCommand {}

impl AboutCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        println!("{}", INSTRUCTIONS);

        println!("\nIndexes:");
        for index in &config.search.indexes {
            println!("  {}", index);
        }
        println!(
            "Relevance threshold: {:.2} (of 4.00)",
            config.search.relevance_threshold
        );

        println!("\nPrompts:");
        for (id, origin) in list_prompts(&config.workspace)? {
            let origin = match origin {
                PromptOrigin::Builtin => "built-in",
                PromptOrigin::Workspace => "workspace",
            };
            println!("  {:<12} {}", id, origin);
        }

        Ok(())
    }
}
