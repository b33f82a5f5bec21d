//! In-memory doubles for the search and completion services.

use crate::client::{RetrievalError, SearchClient};
use crate::rag::chain::{AnswerGenerator, PromptSet};
use crate::rag::ask::QaService;
use crate::types::{RawCaption, RawDocument, SearchResponse};
use smartsearch_core::{AppError, AppResult};
use smartsearch_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Search double returning canned pages per index.
#[derive(Default)]
pub struct FakeSearchClient {
    pages: HashMap<String, SearchResponse>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, index: &str, docs: Vec<RawDocument>) -> Self {
        self.pages.insert(
            index.to_string(),
            SearchResponse {
                count: Some(docs.len() as u64),
                value: docs,
            },
        );
        self
    }

    pub fn failing(mut self, index: &str) -> Self {
        self.failing.insert(index.to_string());
        self
    }

    /// `(index, query)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchClient for FakeSearchClient {
    async fn search(&self, index: &str, query: &str) -> Result<SearchResponse, RetrievalError> {
        self.calls
            .lock()
            .unwrap()
            .push((index.to_string(), query.to_string()));

        if self.failing.contains(index) {
            return Err(RetrievalError::Transport {
                index: index.to_string(),
                message: "connection refused".to_string(),
            });
        }

        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Completion double that replays scripted replies and records requests.
pub struct FakeLlmClient {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    fail: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlmClient {
    /// Answer every request with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests with `replies` in order, then with `fallback`.
    pub fn scripted(replies: &[&str], fallback: &str) -> Self {
        let client = Self::replying(fallback);
        *client.replies.lock().unwrap() = replies.iter().map(|r| r.to_string()).collect();
        client
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlmClient {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(AppError::Llm("HTTP 429: rate limited".to_string()));
        }

        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
            finish_reason: Some("stop".to_string()),
        })
    }
}

/// A complete, well-formed search document.
pub fn doc(id: &str, score: f64, pages: usize) -> RawDocument {
    RawDocument {
        id: Some(id.to_string()),
        title: Some(format!("{}.pdf", id)),
        pages: Some((0..pages).map(|i| format!("{} page {}", id, i + 1)).collect()),
        language: Some("en".to_string()),
        captions: Some(vec![RawCaption {
            text: Some(format!("{} caption", id)),
        }]),
        reranker_score: Some(score),
        metadata_storage_path: Some(format!("https://blob/{}.pdf", id)),
    }
}

/// Built-in prompts, loaded from an empty workspace.
pub fn builtin_prompts() -> PromptSet {
    let dir = tempfile::TempDir::new().unwrap();
    PromptSet::load(dir.path()).unwrap()
}

/// Service wired to the given doubles with the default threshold.
pub fn service(
    search: Arc<FakeSearchClient>,
    llm: Arc<FakeLlmClient>,
    indexes: &[&str],
) -> QaService {
    let generator = AnswerGenerator::new(llm, "gpt-35-turbo", builtin_prompts());
    QaService::new(
        search,
        generator,
        indexes.iter().map(|s| s.to_string()).collect(),
        1.0,
    )
    .with_seed(7)
}
