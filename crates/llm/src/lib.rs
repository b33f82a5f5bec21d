//! Completion-service integration for Smart Search.
//!
//! A small trait-based interface over hosted chat models. The answer
//! pipeline talks to [`LlmClient`] only; [`create_client`] builds the
//! concrete provider from explicit settings.
//!
//! # Providers
//! - **Azure OpenAI**: chat completions on a named deployment
//!
//! # Example
//! ```no_run
//! use smartsearch_core::CompletionSettings;
//! use smartsearch_llm::{create_client, LlmRequest};
//!
//! # async fn example(settings: CompletionSettings) -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client(&settings)?;
//! let request = LlmRequest::new("What is CLP?", &settings.deployment).with_max_tokens(256);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::AzureOpenAiClient;
