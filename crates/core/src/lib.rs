//! Smart Search Core Library
//!
//! Foundational pieces shared by every Smart Search crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (search and completion service settings)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, CompletionSettings, SearchSettings};
pub use error::{AppError, AppResult};
