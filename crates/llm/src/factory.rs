//! LLM provider factory.
//!
//! Builds a completion client from explicit settings. Settings are checked
//! here so that a misconfigured client is never constructed.

use crate::client::LlmClient;
use crate::providers::AzureOpenAiClient;
use smartsearch_core::{AppError, AppResult, CompletionSettings};
use std::sync::Arc;

/// Create the completion client described by `settings`.
///
/// # Errors
/// Returns `AppError::Config` if the endpoint, key or deployment is blank.
pub fn create_client(settings: &CompletionSettings) -> AppResult<Arc<dyn LlmClient>> {
    if settings.endpoint.trim().is_empty() {
        return Err(AppError::Config(
            "Completion endpoint is not configured".to_string(),
        ));
    }
    if settings.api_key.trim().is_empty() {
        return Err(AppError::Config(
            "Completion API key is not configured".to_string(),
        ));
    }
    if settings.deployment.trim().is_empty() {
        return Err(AppError::Config(
            "Completion deployment is not configured".to_string(),
        ));
    }

    tracing::debug!(
        "Creating Azure OpenAI client for deployment '{}'",
        settings.deployment
    );
    Ok(Arc::new(AzureOpenAiClient::new(settings)))
}
