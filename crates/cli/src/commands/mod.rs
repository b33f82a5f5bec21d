//! Command handlers for the Smart Search CLI.

pub mod about;
pub mod ask;
pub mod session;

// Re-export command types for convenience
pub use about::AboutCommand;
pub use ask::AskCommand;
pub use session::SessionCommand;
