//! Question-answering types.

use crate::rag::answer::CitationError;
use crate::types::SearchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartsearch_core::{AppError, AppResult};
use smartsearch_llm::LlmUsage;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lowest accepted sampling temperature.
pub const MIN_TEMPERATURE: f32 = 0.0;
/// Highest accepted sampling temperature.
pub const MAX_TEMPERATURE: f32 = 1.0;
/// Temperature used when none is given.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Check that a temperature is within the accepted range.
pub fn validate_temperature(temperature: f32) -> AppResult<f32> {
    if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(AppError::InvalidInput(format!(
            "Temperature must be between {} and {}, got {}",
            MIN_TEMPERATURE, MAX_TEMPERATURE, temperature
        )))
    }
}

/// How much of each document the model gets to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Captions only, single pass
    Quick,
    /// Every page of every retained document, map then reduce
    Best,
}

impl AnswerMode {
    pub fn chain_type(self) -> ChainType {
        match self {
            AnswerMode::Quick => ChainType::Stuff,
            AnswerMode::Best => ChainType::MapReduce,
        }
    }

    /// Completion token budget.
    pub fn max_tokens(self) -> u32 {
        match self {
            AnswerMode::Quick => 256,
            AnswerMode::Best => 500,
        }
    }

    /// Status line shown while the answer is being generated.
    pub fn progress_message(self) -> &'static str {
        match self {
            AnswerMode::Quick => "Coming up with a quick answer...",
            AnswerMode::Best => "Reading the source documents to provide the best answer...",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerMode::Quick => "quick",
            AnswerMode::Best => "best",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(AnswerMode::Quick),
            "best" => Ok(AnswerMode::Best),
            other => Err(AppError::InvalidInput(format!(
                "Unknown answer mode '{}'. Expected 'quick' or 'best'",
                other
            ))),
        }
    }
}

/// Prompting strategy used by the answer generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// All context concatenated into one prompt
    Stuff,
    /// Extract from each unit, then combine the extracts
    MapReduce,
}

/// A span of text handed to the model, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUnit {
    pub text: String,
    /// Storage location of the source document
    pub source: String,
}

/// Answer text split into body and citations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    pub body: String,
    pub citations: Citations,
}

/// Citation list parsed from the generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Citations {
    Listed(Vec<String>),
    /// Shown as `N/A`; carries why no list could be read
    NotAvailable(CitationError),
}

/// A failure that was recovered locally and is shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// One index could not be queried; its results are missing
    RetrievalFailed { index: String, reason: String },
    /// The results could not be interpreted; none are used
    MalformedResults { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RetrievalFailed { index, reason } => write!(
                f,
                "No data returned from index '{}', check connection ({})",
                index, reason
            ),
            Notice::MalformedResults { reason } => write!(
                f,
                "No data returned from the search service, check connection ({})",
                reason
            ),
        }
    }
}

/// Everything produced for one question, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub id: Uuid,
    pub answered_at: DateTime<Utc>,
    pub query: String,
    pub mode: AnswerMode,
    pub temperature: f32,
    pub answer: ParsedAnswer,
    /// Retained search results in retrieval order
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    /// Language tag steering the answer, if any results were retained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Token usage summed over every completion call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

impl QueryOutcome {
    /// Whether the completion service was called for this outcome.
    pub fn generated(&self) -> bool {
        self.usage.is_some()
    }
}
