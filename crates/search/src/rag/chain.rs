//! Answer generation over context units.
//!
//! Two strategies are supported:
//! - **stuff**: every unit goes into one prompt, one completion call
//! - **map-reduce**: one extraction call per unit, then one call that
//!   combines the non-empty extracts into the final answer

use crate::rag::answer::SOURCES_DELIMITER;
use crate::rag::types::{ChainType, ContextUnit};
use smartsearch_core::AppResult;
use smartsearch_llm::{LlmClient, LlmRequest, LlmUsage};
use smartsearch_prompt::{build_prompt, load_prompt, PromptDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub const STUFF_PROMPT_ID: &str = "qa.stuff";
pub const MAP_PROMPT_ID: &str = "qa.map";
pub const COMBINE_PROMPT_ID: &str = "qa.combine";

/// The prompt definitions the generator renders.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub stuff: PromptDefinition,
    pub map: PromptDefinition,
    pub combine: PromptDefinition,
}

impl PromptSet {
    /// Load all three prompts, honoring workspace overrides.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Ok(Self {
            stuff: load_prompt(workspace, STUFF_PROMPT_ID)?,
            map: load_prompt(workspace, MAP_PROMPT_ID)?,
            combine: load_prompt(workspace, COMBINE_PROMPT_ID)?,
        })
    }
}

/// Raw model output plus what it cost.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub usage: LlmUsage,
    /// Number of completion calls made
    pub calls: usize,
}

/// Per-question sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub chain: ChainType,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Runs a chain strategy against the completion service.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    deployment: String,
    prompts: PromptSet,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>, deployment: impl Into<String>, prompts: PromptSet) -> Self {
        Self {
            client,
            deployment: deployment.into(),
            prompts,
        }
    }

    /// Produce an answer to `question` from `units`.
    ///
    /// `units` must be non-empty; the caller short-circuits otherwise.
    pub async fn generate(
        &self,
        question: &str,
        units: &[ContextUnit],
        language: &str,
        params: GenerationParams,
    ) -> AppResult<Generation> {
        tracing::debug!(
            "Generating answer with {} ({:?}, {} units, temperature {})",
            self.client.provider_name(),
            params.chain,
            units.len(),
            params.temperature
        );

        match params.chain {
            ChainType::Stuff => self.stuff(question, units, language, params).await,
            ChainType::MapReduce => self.map_reduce(question, units, language, params).await,
        }
    }

    async fn stuff(
        &self,
        question: &str,
        units: &[ContextUnit],
        language: &str,
        params: GenerationParams,
    ) -> AppResult<Generation> {
        let summaries = format_units(units.iter().map(|u| (u.text.as_str(), u.source.as_str())));
        let (text, usage) = self
            .answer_from(&self.prompts.stuff, question, &summaries, language, params)
            .await?;

        Ok(Generation {
            text,
            usage,
            calls: 1,
        })
    }

    async fn map_reduce(
        &self,
        question: &str,
        units: &[ContextUnit],
        language: &str,
        params: GenerationParams,
    ) -> AppResult<Generation> {
        let mut usage = LlmUsage::default();
        let mut extracts: Vec<(String, &str)> = Vec::with_capacity(units.len());

        for (i, unit) in units.iter().enumerate() {
            let mut vars = HashMap::new();
            vars.insert("question".to_string(), question.to_string());
            vars.insert("context".to_string(), unit.text.clone());
            let built = build_prompt(&self.prompts.map, vars)?;

            let (text, call_usage) = self.complete(built.system, built.user, params).await?;
            usage = usage.add(call_usage);

            let extract = text.trim();
            if extract.is_empty() {
                tracing::trace!("Map step {} returned nothing relevant", i + 1);
                continue;
            }
            extracts.push((extract.to_string(), unit.source.as_str()));
        }

        tracing::debug!(
            "Map step kept {} of {} extracts",
            extracts.len(),
            units.len()
        );

        let summaries = format_units(extracts.iter().map(|(text, source)| (text.as_str(), *source)));
        let (text, combine_usage) = self
            .answer_from(&self.prompts.combine, question, &summaries, language, params)
            .await?;

        Ok(Generation {
            text,
            usage: usage.add(combine_usage),
            calls: units.len() + 1,
        })
    }

    /// Render a question/summaries prompt and complete it.
    async fn answer_from(
        &self,
        definition: &PromptDefinition,
        question: &str,
        summaries: &str,
        language: &str,
        params: GenerationParams,
    ) -> AppResult<(String, LlmUsage)> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("summaries".to_string(), summaries.to_string());
        vars.insert("language".to_string(), language.to_string());
        vars.insert("delimiter".to_string(), SOURCES_DELIMITER.to_string());

        let built = build_prompt(definition, vars)?;
        self.complete(built.system, built.user, params).await
    }

    async fn complete(
        &self,
        system: Option<String>,
        user: String,
        params: GenerationParams,
    ) -> AppResult<(String, LlmUsage)> {
        let mut request = LlmRequest::new(user, &self.deployment)
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens);
        if let Some(system) = system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        Ok((response.content, response.usage))
    }
}

/// Lay out units as tagged excerpts, separated by blank lines.
fn format_units<'a>(units: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    units
        .map(|(text, source)| format!("Content: {}\nSource: {}", text, source))
        .collect::<Vec<_>>()
        .join("\n\n")
}
