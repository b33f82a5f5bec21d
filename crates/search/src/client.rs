//! Retrieval client for the hosted search index.
//!
//! Each call issues one semantic search against one index:
//! `GET {endpoint}/indexes/{index}/docs` with the `api-key` header.

use crate::types::SearchResponse;
use reqwest::Url;
use smartsearch_core::{AppError, AppResult, SearchSettings};
use thiserror::Error;

/// Ways a single index search can fail.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Connection, TLS or timeout failure
    #[error("request to index '{index}' failed: {message}")]
    Transport { index: String, message: String },

    /// The service answered with a non-success status
    #[error("index '{index}' returned HTTP {status}: {body}")]
    Status {
        index: String,
        status: u16,
        body: String,
    },

    /// The body was not the expected JSON shape
    #[error("index '{index}' returned an unexpected body: {message}")]
    MalformedResponse { index: String, message: String },
}

/// Scored retrieval against a named index.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Run `query` against `index` and return the ranked page of results.
    async fn search(&self, index: &str, query: &str) -> Result<SearchResponse, RetrievalError>;
}

/// Client for the Azure Cognitive Search REST API.
pub struct AzureSearchClient {
    endpoint: Url,
    api_key: String,
    api_version: String,
    semantic_configuration: String,
    top: u32,
    query_language: String,
    client: reqwest::Client,
}

impl AzureSearchClient {
    /// Create a client from explicit settings.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the endpoint or key is blank, or the
    /// endpoint is not an absolute http(s) URL.
    pub fn new(settings: &SearchSettings) -> AppResult<Self> {
        if settings.endpoint.trim().is_empty() {
            return Err(AppError::Config(
                "Search endpoint is not configured".to_string(),
            ));
        }
        if settings.api_key.trim().is_empty() {
            return Err(AppError::Config("Search API key is not configured".to_string()));
        }

        let endpoint = Url::parse(settings.endpoint.trim()).map_err(|e| {
            AppError::Config(format!(
                "Invalid search endpoint '{}': {}",
                settings.endpoint, e
            ))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Invalid search endpoint '{}': not a base URL",
                settings.endpoint
            )));
        }

        Ok(Self {
            endpoint,
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
            semantic_configuration: settings.semantic_configuration.clone(),
            top: settings.top,
            query_language: settings.query_language.clone(),
            client: reqwest::Client::new(),
        })
    }

    /// `{endpoint}/indexes/{index}/docs`, with the index name encoded as a
    /// single path segment.
    fn docs_url(&self, index: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["indexes", index, "docs"]);
        }
        url
    }

    /// Query-string parameters for a semantic search with captions and answers.
    fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("api-version", self.api_version.clone()),
            ("search", query.to_string()),
            ("select", "*".to_string()),
            ("$top", self.top.to_string()),
            ("queryLanguage", self.query_language.clone()),
            ("queryType", "semantic".to_string()),
            ("semanticConfiguration", self.semantic_configuration.clone()),
            ("$count", "true".to_string()),
            ("speller", "lexicon".to_string()),
            ("answers", "extractive|count-3".to_string()),
            ("captions", "extractive|highlight-false".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl SearchClient for AzureSearchClient {
    async fn search(&self, index: &str, query: &str) -> Result<SearchResponse, RetrievalError> {
        let url = self.docs_url(index);
        tracing::debug!(index, "Querying search index");

        let response = self
            .client
            .get(url)
            .header("api-key", &self.api_key)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| RetrievalError::Transport {
                index: index.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!(index, status = status.as_u16(), "Search responded");

        let body = response
            .text()
            .await
            .map_err(|e| RetrievalError::Transport {
                index: index.to_string(),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(RetrievalError::Status {
                index: index.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| RetrievalError::MalformedResponse {
            index: index.to_string(),
            message: e.to_string(),
        })
    }
}
