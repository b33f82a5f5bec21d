//! Question answering orchestration.
//!
//! Retrieves from every configured index, filters by relevance, assembles
//! context for the chosen mode and generates a cited answer.

use crate::client::{AzureSearchClient, SearchClient};
use crate::filter::filter_results;
use crate::types::RetainedResults;
use crate::rag::answer::{no_results, parse_answer};
use crate::rag::chain::{AnswerGenerator, GenerationParams, PromptSet};
use crate::rag::context::{assemble_context, pick_language};
use crate::rag::types::{validate_temperature, AnswerMode, Notice, QueryOutcome};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smartsearch_core::{AppConfig, AppError, AppResult};
use smartsearch_llm::create_client;
use std::sync::{Arc, Mutex};
use tracing::Instrument;
use uuid::Uuid;

/// Message returned for an empty question.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question!";

/// End-to-end question answering over the configured indexes.
pub struct QaService {
    search: Arc<dyn SearchClient>,
    generator: AnswerGenerator,
    indexes: Vec<String>,
    threshold: f64,
    rng: Mutex<StdRng>,
}

impl QaService {
    pub fn new(
        search: Arc<dyn SearchClient>,
        generator: AnswerGenerator,
        indexes: Vec<String>,
        threshold: f64,
    ) -> Self {
        Self {
            search,
            generator,
            indexes,
            threshold,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Build the service against the hosted services in `config`.
    ///
    /// # Errors
    /// Configuration is validated before any client is built, so a missing
    /// endpoint or key fails here without touching the network.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let search = AzureSearchClient::new(&config.search)?;
        let llm = create_client(&config.openai)?;
        let prompts = PromptSet::load(&config.workspace)?;
        let generator = AnswerGenerator::new(llm, config.openai.deployment.clone(), prompts);

        tracing::debug!(
            "Question answering ready: {} index(es), threshold {:.2}",
            config.search.indexes.len(),
            config.search.relevance_threshold
        );

        Ok(Self::new(
            Arc::new(search),
            generator,
            config.search.indexes.clone(),
            config.search.relevance_threshold,
        ))
    }

    /// Make the language pick reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn indexes(&self) -> &[String] {
        &self.indexes
    }

    /// Answer `query` in `mode` at `temperature`.
    ///
    /// Retrieval failures become notices on the outcome. Completion
    /// failures are returned as errors.
    pub async fn ask(
        &self,
        query: &str,
        mode: AnswerMode,
        temperature: f32,
    ) -> AppResult<QueryOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(EMPTY_QUERY_MESSAGE.to_string()));
        }
        let temperature = validate_temperature(temperature)?;

        let id = Uuid::new_v4();
        let span = tracing::info_span!("query", %id, %mode);

        self.answer(id, query, mode, temperature)
            .instrument(span)
            .await
    }

    async fn answer(
        &self,
        id: Uuid,
        query: &str,
        mode: AnswerMode,
        temperature: f32,
    ) -> AppResult<QueryOutcome> {
        tracing::info!("Answering: {}", query);

        let mut notices = Vec::new();
        let mut responses = Vec::with_capacity(self.indexes.len());
        for index in &self.indexes {
            match self.search.search(index, query).await {
                Ok(response) => responses.push(response),
                Err(e) => {
                    tracing::warn!("Retrieval from '{}' failed: {}", index, e);
                    notices.push(Notice::RetrievalFailed {
                        index: index.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let retained = match filter_results(&responses, self.threshold) {
            Ok(retained) => retained,
            Err(e) => {
                tracing::warn!("Discarding search results: {}", e);
                notices.push(Notice::MalformedResults {
                    reason: e.to_string(),
                });
                RetainedResults::new()
            }
        };

        let units = assemble_context(&retained, mode);
        let language = {
            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
            pick_language(&retained, &mut *rng)
        };

        let (answer, usage) = match language.as_deref() {
            Some(language) if !units.is_empty() => {
                let params = GenerationParams {
                    chain: mode.chain_type(),
                    temperature,
                    max_tokens: mode.max_tokens(),
                };
                let generation = self
                    .generator
                    .generate(query, &units, language, params)
                    .await?;

                tracing::info!(
                    "Generated answer in {} call(s), {} tokens",
                    generation.calls,
                    generation.usage.total_tokens
                );
                (parse_answer(&generation.text), Some(generation.usage))
            }
            _ => {
                tracing::info!("No context to answer from");
                (no_results(), None)
            }
        };

        Ok(QueryOutcome {
            id,
            answered_at: Utc::now(),
            query: query.to_string(),
            mode,
            temperature,
            answer,
            results: retained.into_vec(),
            notices,
            language,
            usage,
        })
    }
}
