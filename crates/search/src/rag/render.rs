//! Text and JSON renderings of a query outcome.

use crate::rag::answer::NOT_AVAILABLE;
use crate::rag::types::{Citations, QueryOutcome};
use smartsearch_core::AppResult;
use std::fmt::Write;

/// Markdown-like rendering: notices, answer, sources, then every retained
/// search result with its score.
pub fn render_markdown(outcome: &QueryOutcome) -> String {
    let mut out = String::new();

    for notice in &outcome.notices {
        let _ = writeln!(out, "> {}", notice);
    }
    if !outcome.notices.is_empty() {
        out.push('\n');
    }

    out.push_str("#### Answer\n");
    let _ = writeln!(out, "{}", outcome.answer.body);
    out.push('\n');

    let sources = match &outcome.answer.citations {
        Citations::Listed(list) => list.join(", "),
        Citations::NotAvailable(_) => NOT_AVAILABLE.to_string(),
    };
    let _ = writeln!(out, "Sources: {}", sources);
    out.push_str("\n---\n");

    out.push_str("#### Search Results\n");
    for result in &outcome.results {
        out.push('\n');
        let _ = writeln!(
            out,
            "{}  (Score: {:.2}%)",
            result.title,
            result.score_percent()
        );
        let _ = writeln!(out, "{}", result.caption);
        let _ = writeln!(out, "{}", result.location);
        out.push_str("\n---\n");
    }

    out
}

/// Pretty-printed JSON of the whole outcome.
pub fn render_json(outcome: &QueryOutcome) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}
