//! Azure OpenAI chat-completion provider.
//!
//! Talks to a single chat deployment:
//! `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}`
//! authenticated with the `api-key` header.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde::{Deserialize, Serialize};
use smartsearch_core::{AppError, AppResult, CompletionSettings};

/// Chat message in the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Chat completion response body.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Usage,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Azure OpenAI chat client.
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    /// Create a client from explicit settings.
    pub fn new(settings: &CompletionSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// URL of the chat completions operation for a deployment.
    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    /// Convert LlmRequest to the chat wire format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage::new("system", system));
        }
        messages.push(ChatMessage::new("user", &request.prompt));

        ChatCompletionRequest {
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    /// Convert the wire response to LlmResponse.
    fn convert_response(
        &self,
        response: ChatCompletionResponse,
        deployment: &str,
    ) -> AppResult<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Azure OpenAI returned no choices".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| deployment.to_string()),
            usage: LlmUsage::new(
                response.usage.prompt_tokens,
                response.usage.completion_tokens,
            ),
            finish_reason: choice.finish_reason,
        })
    }
}

/// Turn a non-success body into a readable provider error.
fn describe_error(status: reqwest::StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => match parsed.error.code {
            Some(code) => AppError::Llm(format!(
                "Azure OpenAI error ({}, {}): {}",
                status, code, parsed.error.message
            )),
            None => AppError::Llm(format!(
                "Azure OpenAI error ({}): {}",
                status, parsed.error.message
            )),
        },
        Err(_) => AppError::Llm(format!("Azure OpenAI error ({}): {}", status, body)),
    }
}

#[async_trait::async_trait]
impl LlmClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let deployment = request.model.as_str();

        tracing::debug!(
            deployment,
            max_tokens = ?request.max_tokens,
            temperature = ?request.temperature,
            "Sending completion request to Azure OpenAI"
        );

        let body = self.to_chat_request(request);
        let response = self
            .client
            .post(self.completions_url(deployment))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Azure OpenAI: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to read Azure OpenAI response: {}", e)))?;

        if !status.is_success() {
            return Err(describe_error(status, &text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::Llm(format!("Failed to parse Azure OpenAI response: {}", e)))?;

        let converted = self.convert_response(parsed, deployment)?;
        tracing::debug!(
            "Received completion ({} prompt / {} completion tokens)",
            converted.usage.prompt_tokens,
            converted.usage.completion_tokens
        );

        Ok(converted)
    }
}
