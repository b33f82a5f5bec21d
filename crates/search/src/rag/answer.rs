//! Splitting generated text into answer body and citations.

use crate::rag::types::{Citations, ParsedAnswer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker the prompts ask the model to put before its citation list.
pub const SOURCES_DELIMITER: &str = "SOURCES:";

/// Shown in place of citations that could not be parsed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Answer used when nothing relevant was retrieved.
pub const NO_RESULTS_ANSWER: &str = "No results found";

/// Why no citation list could be read from the generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationError {
    #[error("the answer contains no '{}' marker", SOURCES_DELIMITER)]
    DelimiterAbsent,

    #[error("the '{}' marker is not followed by any source", SOURCES_DELIMITER)]
    EmptyList,
}

/// Read the comma-separated citation list after the delimiter.
///
/// The list ends at the next delimiter, if the model repeated it.
pub fn parse_citations(text: &str) -> Result<Vec<String>, CitationError> {
    let list = text
        .split(SOURCES_DELIMITER)
        .nth(1)
        .ok_or(CitationError::DelimiterAbsent)?;

    let citations: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if citations.is_empty() {
        return Err(CitationError::EmptyList);
    }

    Ok(citations)
}

/// Split generated text into body and citations. Never fails.
pub fn parse_answer(text: &str) -> ParsedAnswer {
    let body = text
        .split(SOURCES_DELIMITER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let citations = match parse_citations(text) {
        Ok(list) => Citations::Listed(list),
        Err(reason) => {
            tracing::debug!("Citations not available: {}", reason);
            Citations::NotAvailable(reason)
        }
    };

    ParsedAnswer { body, citations }
}

/// The answer given when no context could be assembled.
pub fn no_results() -> ParsedAnswer {
    ParsedAnswer {
        body: NO_RESULTS_ANSWER.to_string(),
        citations: Citations::NotAvailable(CitationError::DelimiterAbsent),
    }
}
