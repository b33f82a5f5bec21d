//! Relevance filtering of raw search responses.

use crate::types::{RawDocument, RetainedResults, SearchResponse, SearchResult};
use thiserror::Error;

/// Why a page of results could not be turned into retained results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A field needed to score or keep a result is absent
    #[error("search result {id} is missing '{field}'")]
    MissingField { id: String, field: &'static str },

    /// A result passed the threshold but carries no caption
    #[error("search result {id} has no captions")]
    EmptyCaptions { id: String },
}

/// Keep every result whose reranker score is strictly above `threshold`.
///
/// Responses are walked in order and results keyed by id, so the output
/// follows retrieval order. Fields other than the score are only required
/// for results that pass the threshold. The first malformed result aborts
/// the whole filter.
pub fn filter_results(
    responses: &[SearchResponse],
    threshold: f64,
) -> Result<RetainedResults, FilterError> {
    let mut retained = RetainedResults::new();

    for (page, response) in responses.iter().enumerate() {
        for (position, doc) in response.value.iter().enumerate() {
            let label = || describe(doc, page, position);

            let score = doc.reranker_score.ok_or_else(|| FilterError::MissingField {
                id: label(),
                field: "@search.rerankerScore",
            })?;

            if score <= threshold || score.is_nan() {
                tracing::trace!(id = %label(), score, "Dropping result below threshold");
                continue;
            }

            retained.insert(to_result(doc, score, &label())?);
        }
    }

    tracing::debug!(
        "Retained {} results above threshold {:.2}",
        retained.len(),
        threshold
    );
    Ok(retained)
}

/// Human-readable handle for a document in error messages.
fn describe(doc: &RawDocument, page: usize, position: usize) -> String {
    match doc.id {
        Some(ref id) => id.clone(),
        None => format!("#{}.{}", page + 1, position + 1),
    }
}

fn to_result(doc: &RawDocument, score: f64, label: &str) -> Result<SearchResult, FilterError> {
    let missing = |field: &'static str| FilterError::MissingField {
        id: label.to_string(),
        field,
    };

    let caption = match doc.captions {
        None => return Err(missing("@search.captions")),
        Some(ref captions) => match captions.first() {
            None => {
                return Err(FilterError::EmptyCaptions {
                    id: label.to_string(),
                })
            }
            Some(first) => first
                .text
                .clone()
                .ok_or_else(|| missing("@search.captions.text"))?,
        },
    };

    Ok(SearchResult {
        id: doc.id.clone().ok_or_else(|| missing("id"))?,
        title: doc.title.clone().ok_or_else(|| missing("title"))?,
        chunks: doc.pages.clone().ok_or_else(|| missing("pages"))?,
        language: doc.language.clone().ok_or_else(|| missing("language"))?,
        caption,
        score,
        location: doc
            .metadata_storage_path
            .clone()
            .ok_or_else(|| missing("metadata_storage_path"))?,
    })
}
