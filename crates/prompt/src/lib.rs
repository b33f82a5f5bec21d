//! Prompt system for Smart Search.
//!
//! - YAML prompt definitions, built in or overridden per workspace
//! - Handlebars template rendering in strict mode

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOrigin};
