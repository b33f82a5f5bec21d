//! Search result types.
//!
//! `SearchResponse` mirrors the service's JSON loosely (every document field
//! optional) so that shape problems surface as typed filter errors instead
//! of a failed parse of the whole page. `SearchResult` is the validated form
//! the rest of the pipeline works with.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top of the reranker scale.
pub const MAX_RERANKER_SCORE: f64 = 4.0;

/// One page of results from a single index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total match count, present when `$count=true` was requested
    #[serde(rename = "@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Ranked documents
    pub value: Vec<RawDocument>,
}

/// A document as returned by the search service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Page-sized text chunks of the source document
    #[serde(default)]
    pub pages: Option<Vec<String>>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(rename = "@search.captions", default)]
    pub captions: Option<Vec<RawCaption>>,

    #[serde(rename = "@search.rerankerScore", default)]
    pub reranker_score: Option<f64>,

    #[serde(default)]
    pub metadata_storage_path: Option<String>,
}

/// Extractive caption attached to a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCaption {
    #[serde(default)]
    pub text: Option<String>,
}

/// A retained, fully populated search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document key in the index
    pub id: String,

    pub title: String,

    /// Full text, one entry per page
    pub chunks: Vec<String>,

    /// Language tag detected at indexing time
    pub language: String,

    /// First extractive caption
    pub caption: String,

    /// Reranker score on the 0-4 scale
    pub score: f64,

    /// Storage URI of the source document
    pub location: String,
}

impl SearchResult {
    /// Score as a percentage of the top of the reranker scale, two decimals.
    pub fn score_percent(&self) -> f64 {
        (self.score * 100.0 / MAX_RERANKER_SCORE * 100.0).round() / 100.0
    }
}

/// Results kept after filtering, in first-insertion order.
///
/// Inserting an id that is already present replaces the stored result but
/// keeps the original position.
#[derive(Debug, Clone, Default)]
pub struct RetainedResults {
    entries: Vec<SearchResult>,
    positions: HashMap<String, usize>,
}

impl RetainedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a result keyed by its id.
    pub fn insert(&mut self, result: SearchResult) {
        match self.positions.get(&result.id) {
            Some(&pos) => self.entries[pos] = result,
            None => {
                self.positions.insert(result.id.clone(), self.entries.len());
                self.entries.push(result);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&SearchResult> {
        self.positions.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of page chunks across all retained results.
    pub fn total_chunks(&self) -> usize {
        self.entries.iter().map(|r| r.chunks.len()).sum()
    }

    pub fn into_vec(self) -> Vec<SearchResult> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, score: f64) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: format!("{}.pdf", id),
            chunks: vec!["page".to_string()],
            language: "en".to_string(),
            caption: "caption".to_string(),
            score,
            location: format!("https://storage/{}.pdf", id),
        }
    }

    #[test]
    fn test_score_percent() {
        assert_eq!(result("a", 4.0).score_percent(), 100.0);
        assert_eq!(result("a", 1.25).score_percent(), 31.25);
        assert_eq!(result("a", 2.123456).score_percent(), 53.09);
    }

    #[test]
    fn test_retained_keeps_insertion_order() {
        let mut retained = RetainedResults::new();
        retained.insert(result("c", 2.0));
        retained.insert(result("a", 3.0));
        retained.insert(result("b", 1.5));

        assert_eq!(retained.ids().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_retained_replaces_in_place() {
        let mut retained = RetainedResults::new();
        retained.insert(result("a", 2.0));
        retained.insert(result("b", 2.0));
        retained.insert(result("a", 3.5));

        assert_eq!(retained.len(), 2);
        assert_eq!(retained.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(retained.get("a").map(|r| r.score), Some(3.5));
    }

    #[test]
    fn test_raw_document_deserialization() {
        let json = r#"{
            "@odata.count": 1,
            "value": [{
                "@search.score": 7.1,
                "@search.rerankerScore": 2.4,
                "@search.captions": [{"text": "CLP is a ...", "highlights": ""}],
                "id": "doc-1",
                "title": "Snowflake-Internals.pdf",
                "pages": ["p1", "p2"],
                "language": "en",
                "metadata_storage_path": "https://blob/doc-1.pdf"
            }]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.count, Some(1));
        let doc = &response.value[0];
        assert_eq!(doc.reranker_score, Some(2.4));
        assert_eq!(doc.pages.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            doc.captions.as_ref().and_then(|c| c[0].text.as_deref()),
            Some("CLP is a ...")
        );
    }
}
