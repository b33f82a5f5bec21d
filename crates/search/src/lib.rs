//! Question answering over a hosted semantic search index.
//!
//! Queries one or more indexes, keeps the results the reranker scores as
//! relevant, and has a chat model answer from them with citations.

pub mod client;
pub mod filter;
pub mod rag;
pub mod session;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use client::{AzureSearchClient, RetrievalError, SearchClient};
pub use filter::{filter_results, FilterError};
pub use rag::{AnswerMode, QaService, QueryOutcome};
pub use session::Session;
pub use types::{RetainedResults, SearchResponse, SearchResult};
