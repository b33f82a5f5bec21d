//! Interactive session state.
//!
//! A session holds the current question and temperature, whether an answer
//! has been requested for that question, and the last outcome. Refreshing a
//! submitted session shows the stored outcome again instead of re-running it.

use crate::rag::types::{validate_temperature, QueryOutcome, DEFAULT_TEMPERATURE};
use smartsearch_core::AppResult;

/// Question shown before the user types anything.
pub const DEFAULT_QUERY: &str = "What is CLP?";

#[derive(Debug, Clone)]
pub struct Session {
    query: String,
    temperature: f32,
    submitted: bool,
    last: Option<QueryOutcome>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            submitted: false,
            last: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Replace the question. Returns whether it changed.
    ///
    /// A different question clears the submitted flag and the stored outcome.
    pub fn set_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query == self.query {
            return false;
        }

        self.query = query.to_string();
        self.submitted = false;
        self.last = None;
        true
    }

    pub fn set_temperature(&mut self, temperature: f32) -> AppResult<()> {
        self.temperature = validate_temperature(temperature)?;
        Ok(())
    }

    /// Record that an answer was requested for the current question.
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    /// Store the outcome of the last submission.
    pub fn record(&mut self, outcome: QueryOutcome) {
        self.last = Some(outcome);
    }

    /// The outcome a refresh should show, if any.
    pub fn displayed(&self) -> Option<&QueryOutcome> {
        if self.submitted {
            self.last.as_ref()
        } else {
            None
        }
    }
}
